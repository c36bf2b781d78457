//! Reading detection files back as predictions

use crate::MetricsError;
use lpr_fusion_common::Region;
use lpr_fusion_recorder::{frame_file_name, MISSING_PLATE};
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKind {
    Car,
    Plate,
}

/// One `car` or `plate` line of a detection file
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub kind: PredictionKind,
    pub region: Region,
    pub plate_text: String,
}

impl Prediction {
    /// Region rescaled into ground-truth coordinates
    #[must_use]
    pub fn scaled_region(&self, scale_x: f32, scale_y: f32) -> Region {
        Region::new(
            self.region.left * scale_x,
            self.region.top * scale_y,
            self.region.width * scale_x,
            self.region.height * scale_y,
        )
    }
}

/// Predictions of one frame, split by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePredictions {
    pub cars: Vec<Prediction>,
    pub plates: Vec<Prediction>,
}

/// Parse `car|plate left top width height [text...]`.
///
/// Returns `None` for blank or malformed lines. Missing text becomes `-`.
#[must_use]
pub fn parse_detection_line(line: &str) -> Option<Prediction> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return None;
    }

    let kind = match parts[0].to_ascii_lowercase().as_str() {
        "car" => PredictionKind::Car,
        "plate" => PredictionKind::Plate,
        _ => return None,
    };

    let mut values = [0.0_f32; 4];
    for (value, part) in values.iter_mut().zip(&parts[1..5]) {
        *value = part.parse().ok()?;
    }
    let [left, top, width, height] = values;

    let plate_text = if parts.len() > 5 {
        parts[5..].join(" ")
    } else {
        MISSING_PLATE.to_string()
    };

    Some(Prediction {
        kind,
        region: Region::new(left, top, width, height),
        plate_text,
    })
}

/// Split the lines of one detection file into cars and plates
#[must_use]
pub fn parse_detection_file(contents: &str) -> FramePredictions {
    let mut frame = FramePredictions::default();
    for prediction in contents.lines().filter_map(parse_detection_line) {
        match prediction.kind {
            PredictionKind::Car => frame.cars.push(prediction),
            PredictionKind::Plate => frame.plates.push(prediction),
        }
    }
    frame
}

/// Load `frame_NNNNNN.txt` from `dir`. A missing file is a frame without
/// detections.
pub fn load_frame_predictions(
    dir: &Path,
    frame_number: u64,
) -> Result<FramePredictions, MetricsError> {
    let path = dir.join(frame_file_name(frame_number));
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(parse_detection_file(&contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(FramePredictions::default()),
        Err(source) => Err(MetricsError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}
