//! Detection audit trail
//!
//! Writes one human-readable text file per frame listing every vehicle and
//! plate detection:
//!
//! ```text
//! car 412 388 301.5 188 7ABC123
//! plate 520 530 72 21 7ABC123
//! ```
//!
//! Files are named `frame_NNNNNN.txt` from a process-wide counter that is
//! never reset, so filenames are never reused within one process.
//!
//! Recording is a best-effort side effect: a file that cannot be created or
//! written is logged and skipped, never reported to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use lpr_fusion_common::Frame;
//! use lpr_fusion_recorder::DetectionRecorder;
//!
//! let recorder = DetectionRecorder::new("logs/detections");
//! recorder.prepare();
//!
//! let frame = Frame::default();
//! if let Some(path) = recorder.record_frame(&frame) {
//!     println!("wrote {}", path.display());
//! }
//! ```

use thiserror::Error;

pub mod counter;
pub mod format;
pub mod recorder;

pub use counter::FrameCounter;
pub use format::format_general;
pub use recorder::{frame_file_name, render_lines, DetectionRecorder, MISSING_PLATE};

/// Recorder errors
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for recorder operations
pub type RecorderResult<T> = Result<T, RecorderError>;
