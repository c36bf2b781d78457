//! Integration tests for plate recognition

use lpr_fusion_plate_recognition::{PlateParser, RecognizerLayer, MAX_PLATE_LENGTH};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use tempfile::NamedTempFile;

fn us_dictionary_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for glyph in "0123456789ABCDEFGHIJKLMNPQRSTUVWXYZ".chars() {
        writeln!(file, "{glyph}").unwrap();
    }
    file
}

#[test]
fn test_lazy_dictionary_load_from_file() {
    let file = us_dictionary_file();
    let parser = PlateParser::new(file.path());

    // 35 glyphs, blank = 35
    let indices = [10, 10, 35, 11, 12, 35, 1, 2, 3, 35];
    let confidences = [0.99_f32; 10];
    let attr = parser.parse(&indices, &confidences, 40).unwrap();

    assert_eq!(attr.label, "ABC123");
    assert_eq!(parser.dictionary().unwrap().len(), 35);
}

#[test]
fn test_concurrent_first_decode() {
    let file = us_dictionary_file();
    let parser = Arc::new(PlateParser::new(file.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let parser = Arc::clone(&parser);
            thread::spawn(move || parser.decode(&[1, 2, 3], &[0.9, 0.9, 0.9]).text)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "123");
    }
    assert_eq!(parser.load_attempts(), 1);
}

#[test]
fn test_long_recognizer_output_is_bounded() {
    let file = us_dictionary_file();
    let parser = PlateParser::new(file.path());

    // alternate glyph / blank so every glyph is retained
    let mut indices = Vec::new();
    for i in 0..30 {
        indices.push(i % 35);
        indices.push(35);
    }
    let confidences = vec![0.9_f32; indices.len()];
    let layers = vec![
        RecognizerLayer::Confidences(confidences),
        RecognizerLayer::ClassIndices(indices.clone()),
    ];

    let attr = parser.parse_layers(&layers, (indices.len() * 4) as u32).unwrap();
    assert_eq!(attr.label.chars().count(), MAX_PLATE_LENGTH);
    assert!(attr.label.starts_with("0123456789ABCDEF"));
}

#[test]
fn test_dictionary_created_after_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chars.txt");
    let parser = PlateParser::new(&path);

    assert_eq!(parser.decode(&[0, 1, 2], &[0.9; 3]).char_count, 0);

    std::fs::write(&path, "X\nY\nZ\n").unwrap();
    assert_eq!(parser.decode(&[0, 1, 2], &[0.9; 3]).text, "XYZ");
    assert_eq!(parser.decode(&[2, 1, 0], &[0.9; 3]).text, "ZYX");
    assert_eq!(parser.load_attempts(), 2);
}

#[test]
fn test_empty_dictionary_is_loaded_once() {
    let file = NamedTempFile::new().unwrap();
    let parser = PlateParser::new(file.path());

    for _ in 0..3 {
        let plate = parser.decode(&[0, 1, 2, 0], &[0.9; 4]);
        assert_eq!(plate.text, "");
        assert_eq!(plate.char_count, 0);
    }
    assert!(parser.dictionary().unwrap().is_empty());
    assert_eq!(parser.load_attempts(), 1);
}
