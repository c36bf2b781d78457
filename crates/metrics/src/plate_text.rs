//! Plate text comparison

use lpr_fusion_recorder::MISSING_PLATE;

/// Uppercase and collapse whitespace. The `-` placeholder means no text.
#[must_use]
pub fn normalize_plate_text(text: &str) -> String {
    if text.is_empty() || text == MISSING_PLATE {
        return String::new();
    }
    text.to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Edit distance counted in characters
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() < b.len() { (&b, &a) } else { (&a, &b) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    for (i, lc) in long.iter().enumerate() {
        let mut curr = Vec::with_capacity(short.len() + 1);
        curr.push(i + 1);
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr.push((prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost));
        }
        prev = curr;
    }
    prev[short.len()]
}

/// Character error rate of `predicted` against `truth` after normalization.
///
/// With no truth text the rate is 0.0 for an empty prediction and 1.0
/// otherwise.
#[must_use]
pub fn character_error_rate(predicted: &str, truth: &str) -> f64 {
    let predicted = normalize_plate_text(predicted);
    let truth = normalize_plate_text(truth);
    if truth.is_empty() {
        return if predicted.is_empty() { 0.0 } else { 1.0 };
    }
    levenshtein(&predicted, &truth) as f64 / truth.chars().count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_plate_text("-"), "");
        assert_eq!(normalize_plate_text(""), "");
        assert_eq!(normalize_plate_text("  7abc  123 "), "7ABC 123");
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("ABC", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("sitting", "kitten"), 3);
    }

    #[test]
    fn test_character_error_rate() {
        assert_eq!(character_error_rate("7abc123", "7ABC123"), 0.0);
        assert!((character_error_rate("7ABC12", "7ABC123") - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(character_error_rate("-", ""), 0.0);
        assert_eq!(character_error_rate("ABC", "-"), 1.0);
        assert_eq!(character_error_rate("-", "ABCD"), 1.0);
    }
}
