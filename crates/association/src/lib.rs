//! Cross-stage identity association
//!
//! Plate detections and vehicle detections come from different inference
//! passes and are tracked independently, so their identities do not match by
//! construction. This module stitches each plate to the vehicle box it
//! overlaps most, giving both the vehicle's identity.
//!
//! # Example
//! ```
//! use lpr_fusion_association::associate_frame;
//! use lpr_fusion_common::{DetectedObject, Frame, Region};
//!
//! let mut frame = Frame::with_objects(vec![
//!     DetectedObject::vehicle(42, Region::new(100.0, 100.0, 200.0, 120.0)),
//!     DetectedObject::plate(7, Region::new(170.0, 190.0, 60.0, 20.0)),
//! ]);
//!
//! assert_eq!(associate_frame(&mut frame), 1);
//! assert_eq!(frame.objects[1].identity, 42);
//! ```

use lpr_fusion_common::{Batch, DetectedObject, Frame, Region};
use tracing::{debug, trace};

/// Best-overlapping vehicle for a plate region: `(identity, iou)`.
///
/// Ties keep the first vehicle in frame order. Returns `None` when no vehicle
/// overlaps the plate at all.
#[must_use]
pub fn best_parent(vehicles: &[(u64, Region)], plate: &Region) -> Option<(u64, f32)> {
    let mut best: Option<(u64, f32)> = None;
    let mut max_iou = 0.0_f32;

    for (identity, region) in vehicles {
        let score = region.iou(plate);
        if score > max_iou {
            max_iou = score;
            best = Some((*identity, score));
        }
    }

    best
}

/// Rewrite every plate identity in `frame` to that of its parent vehicle.
///
/// Plates without an overlapping vehicle keep their identity. Returns the
/// number of plates linked to a vehicle.
pub fn associate_frame(frame: &mut Frame) -> usize {
    let vehicles: Vec<(u64, Region)> = frame
        .vehicles()
        .map(|v| (v.identity, v.region))
        .collect();

    let mut linked = 0;
    for plate in frame.objects.iter_mut().filter(|o| o.is_plate()) {
        if relink(plate, &vehicles) {
            linked += 1;
        }
    }
    linked
}

/// Run [`associate_frame`] on every frame of a batch
pub fn associate_batch(batch: &mut Batch) -> usize {
    batch.frames.iter_mut().map(associate_frame).sum()
}

fn relink(plate: &mut DetectedObject, vehicles: &[(u64, Region)]) -> bool {
    match best_parent(vehicles, &plate.region) {
        Some((identity, score)) => {
            debug!(
                "Plate {} linked to vehicle {} (IoU {:.3})",
                plate.identity, identity, score
            );
            plate.identity = identity;
            true
        }
        None => {
            trace!("Plate {} overlaps no vehicle", plate.identity);
            false
        }
    }
}
