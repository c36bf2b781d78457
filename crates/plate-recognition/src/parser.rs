//! Recognizer output parsing: the integration point between the inference
//! collaborator and the sequence decoder

use crate::decoder::{decode, DecodedPlate};
use crate::dictionary::{CharacterDictionary, DictionaryError};
use lpr_fusion_common::{stage, Classification, DetectedObject};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Default location of the US plate character set
pub const DEFAULT_DICTIONARY_PATH: &str = "/workspace/models/lpr_us/us_lp_characters.txt";

/// Plates with fewer decoded characters than this are discarded as unreliable
pub const MIN_PLATE_CHARS: usize = 3;

/// Recognizer time steps per network input column
const INPUT_COLUMNS_PER_STEP: u32 = 4;

/// One output layer of the plate recognizer
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerLayer {
    /// Network input binding; never decoded
    Input,
    /// Per-step confidence of the argmax class
    Confidences(Vec<f32>),
    /// Per-step argmax class index
    ClassIndices(Vec<i32>),
}

/// Plate label produced for a plate object
#[derive(Debug, Clone, PartialEq)]
pub struct PlateAttribute {
    pub label: String,
    /// Product of the per-character confidences
    pub confidence: f64,
}

impl PlateAttribute {
    /// Store this label on `object` as the plate-recognizer classification
    pub fn attach_to(&self, object: &mut DetectedObject) {
        object.classifications.insert(
            stage::PLATE_RECOGNIZER,
            Classification::new(self.label.clone()).with_confidence(self.confidence as f32),
        );
    }
}

/// Decodes recognizer output with a lazily loaded character dictionary.
///
/// The dictionary is read on the first decode request. Concurrent first
/// requests load it once; a failed load is retried on the next request.
pub struct PlateParser {
    dictionary_path: PathBuf,
    dictionary: OnceCell<CharacterDictionary>,
    load_attempts: AtomicUsize,
}

impl PlateParser {
    pub fn new(dictionary_path: impl AsRef<Path>) -> Self {
        Self {
            dictionary_path: dictionary_path.as_ref().to_path_buf(),
            dictionary: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Parser with an already loaded dictionary
    #[must_use]
    pub fn with_dictionary(dictionary: CharacterDictionary) -> Self {
        Self {
            dictionary_path: PathBuf::new(),
            dictionary: OnceCell::with_value(dictionary),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Get or load the dictionary (cached after the first successful load)
    pub fn dictionary(&self) -> Result<&CharacterDictionary, DictionaryError> {
        self.dictionary.get_or_try_init(|| {
            self.load_attempts.fetch_add(1, Ordering::SeqCst);
            info!(
                "Loading plate character dictionary from {} (first time only)",
                self.dictionary_path.display()
            );
            CharacterDictionary::from_file(&self.dictionary_path)
        })
    }

    /// Number of times the dictionary file has been read
    #[must_use]
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    /// Decode one sequence. A dictionary that cannot be loaded yields an empty
    /// plate rather than an error.
    pub fn decode(&self, class_indices: &[i32], confidences: &[f32]) -> DecodedPlate {
        match self.dictionary() {
            Ok(dictionary) => decode(class_indices, confidences, dictionary),
            Err(e) => {
                warn!("Plate dictionary unavailable, skipping decode: {}", e);
                DecodedPlate::default()
            }
        }
    }

    /// Decode `network_width / 4` time steps and apply the minimum length
    /// cutoff.
    pub fn parse(
        &self,
        class_indices: &[i32],
        confidences: &[f32],
        network_width: u32,
    ) -> Option<PlateAttribute> {
        let seq_len = (network_width / INPUT_COLUMNS_PER_STEP) as usize;
        let seq_len = seq_len.min(class_indices.len()).min(confidences.len());

        let plate = self.decode(&class_indices[..seq_len], &confidences[..seq_len]);
        if plate.char_count < MIN_PLATE_CHARS {
            debug!(
                "Discarding short plate '{}' ({} chars)",
                plate.text, plate.char_count
            );
            return None;
        }

        let confidence = plate.aggregate_confidence();
        Some(PlateAttribute {
            label: plate.text,
            confidence,
        })
    }

    /// Parse raw recognizer layers. The first confidence layer and the first
    /// class-index layer are used; input bindings are ignored.
    pub fn parse_layers(
        &self,
        layers: &[RecognizerLayer],
        network_width: u32,
    ) -> Option<PlateAttribute> {
        let mut confidences = None;
        let mut class_indices = None;

        for layer in layers {
            match layer {
                RecognizerLayer::Input => {}
                RecognizerLayer::Confidences(values) => {
                    confidences.get_or_insert(values.as_slice());
                }
                RecognizerLayer::ClassIndices(values) => {
                    class_indices.get_or_insert(values.as_slice());
                }
            }
        }

        match (class_indices, confidences) {
            (Some(indices), Some(confidences)) => self.parse(indices, confidences, network_width),
            _ => {
                warn!("Recognizer output is missing a confidence or class-index layer");
                None
            }
        }
    }
}
