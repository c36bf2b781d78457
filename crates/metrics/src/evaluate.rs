//! Detection and plate recognition scores over a set of annotated frames

use crate::coco::{frame_index_from_file_name, GroundTruth, ImageTruth};
use crate::matching::{match_greedy, plates_for_cars, MatchResult};
use crate::plate_text::{character_error_rate, normalize_plate_text};
use crate::predictions::{load_frame_predictions, FramePredictions, Prediction};
use crate::MetricsError;
use lpr_fusion_common::Region;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

fn safe_div(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// How detection files line up with the annotated images
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationOptions {
    /// Detection file number = annotated frame index + offset
    pub frame_offset: i64,
    /// Resolution the detections were recorded at
    pub detection_width: u32,
    pub detection_height: u32,
    pub iou_threshold: f32,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            frame_offset: 1,
            detection_width: 1920,
            detection_height: 1080,
            iou_threshold: 0.5,
        }
    }
}

/// True/false positive and false negative counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionCounts {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl DetectionCounts {
    fn from_match(result: &MatchResult) -> Self {
        Self {
            true_positives: result.pairs.len() as u64,
            false_positives: result.unmatched_predictions.len() as u64,
            false_negatives: result.unmatched_truth.len() as u64,
        }
    }

    pub fn add(&mut self, other: &DetectionCounts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    #[must_use]
    pub fn precision(&self) -> f64 {
        let tp = self.true_positives as f64;
        safe_div(tp, tp + self.false_positives as f64)
    }

    #[must_use]
    pub fn recall(&self) -> f64 {
        let tp = self.true_positives as f64;
        safe_div(tp, tp + self.false_negatives as f64)
    }

    #[must_use]
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        safe_div(2.0 * p * r, p + r)
    }
}

/// Plate text agreement over matched cars that have an annotated plate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LprCounts {
    pub exact: u64,
    pub total: u64,
    pub cer_sum: f64,
}

impl LprCounts {
    pub fn add(&mut self, other: &LprCounts) {
        self.exact += other.exact;
        self.total += other.total;
        self.cer_sum += other.cer_sum;
    }

    #[must_use]
    pub fn exact_rate(&self) -> f64 {
        safe_div(self.exact as f64, self.total as f64)
    }

    #[must_use]
    pub fn mean_cer(&self) -> f64 {
        safe_div(self.cer_sum, self.total as f64)
    }
}

/// Accumulated counts for cars, plates and plate text
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Evaluation {
    pub cars: DetectionCounts,
    pub plates: DetectionCounts,
    pub lpr: LprCounts,
    /// Images that took part in the evaluation
    pub frames: u64,
}

impl Evaluation {
    fn add(&mut self, other: &Evaluation) {
        self.cars.add(&other.cars);
        self.plates.add(&other.plates);
        self.lpr.add(&other.lpr);
        self.frames += other.frames;
    }

    #[must_use]
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            car_detection: DetectionSummary::from(&self.cars),
            license_plate_detection: DetectionSummary::from(&self.plates),
            lpr: LprSummary {
                exact_match_rate: round4(self.lpr.exact_rate()),
                character_error_rate_mean: round4(self.lpr.mean_cer()),
                pairs_evaluated: self.lpr.total,
            },
        }
    }
}

fn regions(predictions: &[Prediction], scale_x: f32, scale_y: f32) -> Vec<Region> {
    predictions
        .iter()
        .map(|p| p.scaled_region(scale_x, scale_y))
        .collect()
}

/// Score the predictions of one frame against one annotated image
#[must_use]
pub fn evaluate_frame(
    truth: &ImageTruth,
    predictions: &FramePredictions,
    options: &EvaluationOptions,
) -> Evaluation {
    let scale_x = truth.width as f32 / options.detection_width as f32;
    let scale_y = truth.height as f32 / options.detection_height as f32;

    let pred_cars = regions(&predictions.cars, scale_x, scale_y);
    let pred_plates = regions(&predictions.plates, scale_x, scale_y);
    let truth_plates: Vec<Region> = truth.plates.iter().map(|p| p.region).collect();

    let car_match = match_greedy(&pred_cars, &truth.cars, options.iou_threshold);
    let plate_match = match_greedy(&pred_plates, &truth_plates, options.iou_threshold);

    let truth_texts = plates_for_cars(&truth.plates, &truth.cars);
    let mut lpr = LprCounts::default();
    for &(pred_idx, truth_idx) in &car_match.pairs {
        let Some(truth_text) = truth_texts.get(truth_idx).copied().flatten() else {
            continue;
        };
        let pred_text = predictions.cars[pred_idx].plate_text.as_str();

        lpr.total += 1;
        if normalize_plate_text(pred_text) == normalize_plate_text(truth_text) {
            lpr.exact += 1;
        }
        lpr.cer_sum += character_error_rate(pred_text, truth_text);
    }

    Evaluation {
        cars: DetectionCounts::from_match(&car_match),
        plates: DetectionCounts::from_match(&plate_match),
        lpr,
        frames: 1,
    }
}

/// Score every annotated image against the detection files in
/// `detections_dir`.
///
/// Images whose file name carries no frame index are skipped. A frame
/// without a detection file counts all of its annotations as missed.
pub fn evaluate(
    truth: &GroundTruth,
    detections_dir: &Path,
    options: &EvaluationOptions,
) -> Result<Evaluation, MetricsError> {
    let mut total = Evaluation::default();

    for image in &truth.images {
        let Some(index) = frame_index_from_file_name(&image.file_name) else {
            debug!("Skipping image {} ({:?})", image.id, image.file_name);
            continue;
        };

        let frame_number = i64::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(options.frame_offset))
            .and_then(|n| u64::try_from(n).ok());
        let predictions = match frame_number {
            Some(n) => load_frame_predictions(detections_dir, n)?,
            None => FramePredictions::default(),
        };

        total.add(&evaluate_frame(image, &predictions, options));
    }

    info!(
        "Evaluated {} frames: {} car pairs, {} plate pairs, {} plate texts",
        total.frames, total.cars.true_positives, total.plates.true_positives, total.lpr.total
    );
    Ok(total)
}

/// Rounded detection scores. With a single confidence threshold AP@0.5
/// reduces to precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionSummary {
    #[serde(rename = "mAP@0.5")]
    pub map_50: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    #[serde(rename = "TP")]
    pub tp: u64,
    #[serde(rename = "FP")]
    pub fp: u64,
    #[serde(rename = "FN")]
    pub fn_: u64,
}

impl From<&DetectionCounts> for DetectionSummary {
    fn from(c: &DetectionCounts) -> Self {
        Self {
            map_50: round4(c.precision()),
            precision: round4(c.precision()),
            recall: round4(c.recall()),
            f1: round4(c.f1()),
            tp: c.true_positives,
            fp: c.false_positives,
            fn_: c.false_negatives,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LprSummary {
    pub exact_match_rate: f64,
    pub character_error_rate_mean: f64,
    pub pairs_evaluated: u64,
}

/// Report written as JSON and printed for humans
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub car_detection: DetectionSummary,
    pub license_plate_detection: DetectionSummary,
    pub lpr: LprSummary,
}

fn write_detection(f: &mut fmt::Formatter<'_>, title: &str, d: &DetectionSummary) -> fmt::Result {
    writeln!(f, "## {title}")?;
    writeln!(f, "  mAP@0.5:   {:.4}", d.map_50)?;
    writeln!(f, "  Precision: {:.4}", d.precision)?;
    writeln!(f, "  Recall:    {:.4}", d.recall)?;
    writeln!(f, "  F1:        {:.4}", d.f1)?;
    writeln!(f, "  TP/FP/FN:  {} / {} / {}", d.tp, d.fp, d.fn_)?;
    writeln!(f)
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_detection(f, "Car detection (vs COCO car)", &self.car_detection)?;
        write_detection(
            f,
            "License plate detection (vs COCO license_plate)",
            &self.license_plate_detection,
        )?;
        writeln!(f, "## LPR (plate text)")?;
        writeln!(f, "  Exact match rate:  {:.4}", self.lpr.exact_match_rate)?;
        writeln!(f, "  CER (mean):        {:.4}", self.lpr.character_error_rate_mean)?;
        write!(f, "  Pairs evaluated:   {}", self.lpr.pairs_evaluated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::TruthPlate;
    use crate::predictions::parse_detection_file;

    fn image(cars: Vec<Region>, plates: Vec<TruthPlate>) -> ImageTruth {
        ImageTruth {
            id: 1,
            file_name: "frame_000000.png".to_string(),
            width: 3840,
            height: 2160,
            cars,
            plates,
        }
    }

    #[test]
    fn test_counts_scores() {
        let counts = DetectionCounts {
            true_positives: 3,
            false_positives: 1,
            false_negatives: 2,
        };
        assert!((counts.precision() - 0.75).abs() < 1e-12);
        assert!((counts.recall() - 0.6).abs() < 1e-12);
        assert!((counts.f1() - 2.0 * 0.75 * 0.6 / 1.35).abs() < 1e-12);
        assert_eq!(DetectionCounts::default().f1(), 0.0);
    }

    #[test]
    fn test_frame_is_scaled_to_truth_resolution() {
        let truth = image(
            vec![Region::new(200.0, 200.0, 800.0, 400.0)],
            vec![TruthPlate {
                region: Region::new(500.0, 450.0, 120.0, 40.0),
                text: "7ABC123".to_string(),
            }],
        );
        // Half the truth resolution
        let predictions =
            parse_detection_file("car 100 100 400 200 7ABC128\nplate 250 225 60 20 7ABC128\n");

        let eval = evaluate_frame(&truth, &predictions, &EvaluationOptions::default());
        assert_eq!(eval.cars.true_positives, 1);
        assert_eq!(eval.plates.true_positives, 1);
        assert_eq!(eval.lpr.total, 1);
        assert_eq!(eval.lpr.exact, 0);
        assert!((eval.lpr.cer_sum - 1.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_car_without_annotated_plate_has_no_text_pair() {
        let truth = image(vec![Region::new(0.0, 0.0, 200.0, 200.0)], Vec::new());
        let predictions = parse_detection_file("car 0 0 100 100 ABC\n");

        let eval = evaluate_frame(&truth, &predictions, &EvaluationOptions::default());
        assert_eq!(eval.cars.true_positives, 1);
        assert_eq!(eval.lpr.total, 0);
    }

    #[test]
    fn test_summary_json_keys() {
        let eval = Evaluation {
            cars: DetectionCounts {
                true_positives: 2,
                false_positives: 1,
                false_negatives: 0,
            },
            ..Evaluation::default()
        };
        let json = serde_json::to_value(eval.summary()).unwrap();

        assert_eq!(json["car_detection"]["mAP@0.5"], 0.6667);
        assert_eq!(json["car_detection"]["TP"], 2);
        assert_eq!(json["car_detection"]["FN"], 0);
        assert_eq!(json["lpr"]["pairs_evaluated"], 0);
        assert!(eval.summary().to_string().contains("TP/FP/FN:  2 / 1 / 0"));
    }
}
