//! Fusion Layer - Consolidated Vehicle Records and Message Gating
//!
//! Combines the labels that the classifier stages attached to vehicle and
//! plate detections into one consolidated record per object, and decides
//! whether a batch carries anything worth sending downstream.
//!
//! ## Architecture
//!
//! The fusion layer performs:
//! 1. **Composition**: Render `Vehicle ID / Brand / Type / Plate` payloads and
//!    attach them to each frame as side-data
//! 2. **Gating**: Drop batches from the message branch when a frame carries no
//!    side-data
//!
//! Association (`lpr-fusion-association`) must run first so that plates carry
//! their vehicle's identity.
//!
//! ## Example
//!
//! ```rust
//! use lpr_fusion::{compose_frame, should_continue};
//! use lpr_fusion_common::{stage, Classification, DetectedObject, Frame, Region};
//!
//! let mut frame = Frame::with_objects(vec![DetectedObject::vehicle(
//!     12,
//!     Region::new(0.0, 0.0, 200.0, 100.0),
//! )
//! .with_classification(stage::BRAND_CLASSIFIER, Classification::new("ford"))]);
//!
//! assert!(!should_continue(&frame));
//! compose_frame(&mut frame);
//! assert!(should_continue(&frame));
//! assert_eq!(
//!     frame.side_data[0].payload(),
//!     "Vehicle ID: 12, Brand: ford, Type: NULL, Plate: NULL"
//! );
//! ```

pub mod composer;
pub mod gate;

pub use composer::{build_records, compose_batch, compose_frame, render_payload, MISSING_FIELD};
pub use gate::{gate_batch, should_continue, GateDecision};
