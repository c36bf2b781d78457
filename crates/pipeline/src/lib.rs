//! LPR Fusion Pipeline
//!
//! Runs the fusion probes over each batch coming out of the vehicle and
//! plate inference stages:
//!
//! 1. **association**: plates take the identity of the best-overlapping vehicle
//! 2. **compose**: one side-data record per vehicle and plate
//! 3. **record**: per-frame detection files (when enabled)
//! 4. **gate**: batches containing an empty frame are not forwarded
//!
//! Dropped batches are still handed back so they can be displayed.
//!
//! # Example
//!
//! ```rust,no_run
//! use lpr_fusion_common::Batch;
//! use lpr_fusion_pipeline::{FusionPipeline, PipelineConfig};
//!
//! let config = PipelineConfig::load(None)?;
//! let pipeline = FusionPipeline::from_config(&config);
//!
//! let out = pipeline.process(Batch::default());
//! if out.forward_to_transport {
//!     for frame in &out.batch.frames {
//!         for record in &frame.side_data {
//!             println!("{}", record.payload());
//!         }
//!     }
//! }
//! # Ok::<(), lpr_fusion_pipeline::ConfigError>(())
//! ```

pub mod config;
pub mod pipeline;
pub mod probe;
pub mod stats;

pub use config::{ConfigError, PipelineConfig, DETECTION_OUTPUT_DIR_ENV, DICTIONARY_PATH_ENV};
pub use pipeline::{FusionPipeline, ProcessedBatch};
pub use probe::{AssociationProbe, ComposeProbe, GateProbe, Probe, ProbeReturn, RecordProbe};
pub use stats::{PipelineStats, StatsSummary};
