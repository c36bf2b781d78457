//! Offline evaluation of detection files
//!
//! Compares the `frame_NNNNNN.txt` files written by the detection recorder
//! against COCO ground truth (`car` and `license_plate` categories, plate
//! text in the `value` attribute) and reports:
//!
//! - car and plate detection precision, recall and F1 from greedy IoU matching
//! - plate text exact-match rate and mean character error rate for matched
//!   cars whose annotated plate centre lies inside the car box
//!
//! Detections are rescaled from the recording resolution to each image's
//! annotated resolution before matching.
//!
//! # Example
//!
//! ```rust,no_run
//! use lpr_fusion_metrics::{evaluate, EvaluationOptions, GroundTruth};
//! use std::path::Path;
//!
//! let truth = GroundTruth::load("data/annotations/instances_default.json")?;
//! let evaluation = evaluate(&truth, Path::new("logs/detections"), &EvaluationOptions::default())?;
//! println!("{}", evaluation.summary());
//! # Ok::<(), lpr_fusion_metrics::MetricsError>(())
//! ```

use thiserror::Error;

pub mod coco;
pub mod evaluate;
pub mod matching;
pub mod plate_text;
pub mod predictions;

pub use coco::{frame_index_from_file_name, GroundTruth, ImageTruth, TruthPlate};
pub use evaluate::{
    evaluate, evaluate_frame, DetectionCounts, DetectionSummary, Evaluation, EvaluationOptions,
    LprCounts, LprSummary, MetricsSummary,
};
pub use matching::{match_greedy, plates_for_cars, MatchResult};
pub use plate_text::{character_error_rate, levenshtein, normalize_plate_text};
pub use predictions::{
    load_frame_predictions, parse_detection_file, parse_detection_line, FramePredictions,
    Prediction, PredictionKind,
};

/// Evaluation errors
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid COCO annotations: {0}")]
    Coco(#[from] serde_json::Error),
}
