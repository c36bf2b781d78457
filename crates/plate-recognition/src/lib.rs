//! License plate character recognition post-processing
//!
//! This module turns the raw output of a plate-character recognizer (one class
//! index and one confidence per time step) into a plate string using CTC-style
//! collapse.
//!
//! # Features
//! - Character dictionary loading (one glyph per line, blank = dictionary length)
//! - Pure CTC collapse with a fixed per-plate character bound
//! - Lazy, load-once dictionary shared across decode requests
//! - Recognizer output parsing with a minimum plate length cutoff
//!
//! # Example
//! ```
//! use lpr_fusion_plate_recognition::{decode, CharacterDictionary};
//!
//! let dict = CharacterDictionary::from_glyphs(vec!["A".into(), "B".into(), "C".into()]);
//! let plate = decode(&[0, 0, 1, 3, 3, 2], &[0.9, 0.9, 0.8, 0.1, 0.1, 0.7], &dict);
//!
//! assert_eq!(plate.text, "ABC");
//! assert_eq!(plate.char_count, 3);
//! ```

pub mod decoder;
pub mod dictionary;
pub mod parser;

pub use decoder::{ctc_collapse, decode, DecodedPlate, DecodedSequence, MAX_PLATE_LENGTH};
pub use dictionary::{CharacterDictionary, DictionaryError};
pub use parser::{
    PlateAttribute, PlateParser, RecognizerLayer, DEFAULT_DICTIONARY_PATH, MIN_PLATE_CHARS,
};
