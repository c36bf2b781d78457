//! Prediction to ground-truth matching

use crate::coco::TruthPlate;
use lpr_fusion_common::Region;

/// Outcome of one-to-one box matching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// `(prediction index, truth index)` pairs
    pub pairs: Vec<(usize, usize)>,
    pub unmatched_predictions: Vec<usize>,
    pub unmatched_truth: Vec<usize>,
}

/// Greedy one-to-one matching by descending IoU.
///
/// Only pairs with IoU at or above `iou_threshold` are candidates. Equal IoU
/// keeps prediction order, then truth order.
#[must_use]
pub fn match_greedy(predictions: &[Region], truth: &[Region], iou_threshold: f32) -> MatchResult {
    let mut candidates: Vec<(f32, usize, usize)> = Vec::new();
    for (pi, pred) in predictions.iter().enumerate() {
        for (gi, gt) in truth.iter().enumerate() {
            let iou = pred.iou(gt);
            if iou >= iou_threshold {
                candidates.push((iou, pi, gi));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut pred_used = vec![false; predictions.len()];
    let mut truth_used = vec![false; truth.len()];
    let mut pairs = Vec::new();
    for (_, pi, gi) in candidates {
        if !pred_used[pi] && !truth_used[gi] {
            pred_used[pi] = true;
            truth_used[gi] = true;
            pairs.push((pi, gi));
        }
    }

    let unused = |used: &[bool]| -> Vec<usize> {
        used.iter()
            .enumerate()
            .filter(|&(_, &u)| !u)
            .map(|(i, _)| i)
            .collect()
    };

    MatchResult {
        pairs,
        unmatched_predictions: unused(&pred_used),
        unmatched_truth: unused(&truth_used),
    }
}

fn center_inside(plate: &Region, car: &Region) -> bool {
    let cx = plate.left + plate.width / 2.0;
    let cy = plate.top + plate.height / 2.0;
    car.left <= cx && cx <= car.right() && car.top <= cy && cy <= car.bottom()
}

/// Plate text of each annotated car: the first unclaimed plate whose centre
/// lies inside the car box. Each plate is claimed by at most one car.
#[must_use]
pub fn plates_for_cars<'a>(plates: &'a [TruthPlate], cars: &[Region]) -> Vec<Option<&'a str>> {
    let mut claimed = vec![false; plates.len()];
    cars.iter()
        .map(|car| {
            let (idx, plate) = plates
                .iter()
                .enumerate()
                .find(|(i, p)| !claimed[*i] && center_inside(&p.region, car))?;
            claimed[idx] = true;
            Some(plate.text.as_str())
        })
        .collect()
}
