//! CTC collapse of per-time-step recognizer output

use crate::dictionary::CharacterDictionary;

/// Maximum number of characters kept per plate. Characters past this bound
/// are dropped; the earliest ones are kept.
pub const MAX_PLATE_LENGTH: usize = 16;

/// Collapsed class sequence produced by [`ctc_collapse`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedSequence {
    /// Retained non-blank class indices, in time order
    pub indices: Vec<usize>,
    /// Confidence of each retained character, taken at the step it was retained
    pub confidences: Vec<f64>,
    /// Number of retained non-blank characters (never above [`MAX_PLATE_LENGTH`])
    pub char_count: usize,
}

impl DecodedSequence {
    /// Product of all per-character confidences. An empty sequence yields 1.0.
    #[must_use]
    pub fn aggregate_confidence(&self) -> f64 {
        self.confidences.iter().product()
    }
}

/// Decoded plate string with per-character confidences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPlate {
    pub text: String,
    pub char_confidences: Vec<f64>,
    pub char_count: usize,
}

impl DecodedPlate {
    /// Product of all per-character confidences. An empty plate yields 1.0.
    #[must_use]
    pub fn aggregate_confidence(&self) -> f64 {
        self.char_confidences.iter().product()
    }
}

/// Collapse a raw class sequence.
///
/// Indices outside `[0, dictionary_size]` are skipped. A step is retained when
/// its class differs from the previous non-skipped step. `dictionary_size`
/// itself is the blank class: it ends a run but emits nothing.
#[must_use]
pub fn ctc_collapse(
    class_indices: &[i32],
    confidences: &[f32],
    dictionary_size: usize,
) -> DecodedSequence {
    let mut sequence = DecodedSequence {
        indices: Vec::with_capacity(MAX_PLATE_LENGTH),
        confidences: Vec::with_capacity(MAX_PLATE_LENGTH),
        char_count: 0,
    };
    let mut prev: Option<usize> = None;

    for (&raw, &confidence) in class_indices.iter().zip(confidences) {
        let class = match usize::try_from(raw) {
            Ok(class) if class <= dictionary_size => class,
            _ => continue,
        };

        if prev == Some(class) {
            continue;
        }
        prev = Some(class);

        if class == dictionary_size || sequence.char_count == MAX_PLATE_LENGTH {
            continue;
        }

        sequence.indices.push(class);
        sequence.confidences.push(f64::from(confidence));
        sequence.char_count += 1;
    }

    sequence
}

/// Collapse a raw class sequence and render it through `dictionary`
#[must_use]
pub fn decode(
    class_indices: &[i32],
    confidences: &[f32],
    dictionary: &CharacterDictionary,
) -> DecodedPlate {
    let sequence = ctc_collapse(class_indices, confidences, dictionary.len());

    let text = sequence
        .indices
        .iter()
        .filter_map(|&idx| dictionary.glyph(idx))
        .collect::<String>();

    DecodedPlate {
        text,
        char_confidences: sequence.confidences,
        char_count: sequence.char_count,
    }
}
