/// Common types shared by every stage of the plate fusion pipeline
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Inference stage identifiers carried on objects and classifier results
pub mod stage {
    /// Primary vehicle detector
    pub const VEHICLE_DETECTOR: u32 = 1;
    /// Vehicle brand classifier (runs on vehicle objects)
    pub const BRAND_CLASSIFIER: u32 = 2;
    /// Vehicle type classifier (runs on vehicle objects)
    pub const TYPE_CLASSIFIER: u32 = 3;
    /// License plate detector (runs inside vehicle crops)
    pub const PLATE_DETECTOR: u32 = 4;
    /// Plate character recognizer (runs on plate objects)
    pub const PLATE_RECOGNIZER: u32 = 5;
}

/// Detector class id of the vehicle class. Only objects of this class are
/// messaged and recorded.
pub const VEHICLE_CLASS_ID: u32 = 0;

/// Processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Axis-aligned rectangle in pipeline frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    #[must_use]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[must_use]
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[must_use]
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Intersection over Union with another region.
    ///
    /// Non-overlapping regions yield 0.0, as does a zero-area union.
    #[must_use]
    #[inline]
    pub fn iou(&self, other: &Region) -> f32 {
        let x1 = self.left.max(other.left);
        let y1 = self.top.max(other.top);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        let intersection_area = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union_area = self.area() + other.area() - intersection_area;

        if union_area > 0.0 {
            intersection_area / union_area
        } else {
            0.0
        }
    }
}

/// Label attached to an object by a classifier stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl Classification {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: default_confidence(),
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

/// A single detection produced by one inference stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub stage_id: u32,
    #[serde(default)]
    pub class_id: u32,
    /// Tracker identity. Not unique across stages until association runs.
    pub identity: u64,
    pub region: Region,
    /// Classifier results keyed by classifier stage id
    #[serde(default)]
    pub classifications: BTreeMap<u32, Classification>,
}

impl DetectedObject {
    #[must_use]
    pub fn new(stage_id: u32, identity: u64, region: Region) -> Self {
        Self {
            stage_id,
            class_id: VEHICLE_CLASS_ID,
            identity,
            region,
            classifications: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn vehicle(identity: u64, region: Region) -> Self {
        Self::new(stage::VEHICLE_DETECTOR, identity, region)
    }

    #[must_use]
    pub fn plate(identity: u64, region: Region) -> Self {
        Self::new(stage::PLATE_DETECTOR, identity, region)
    }

    #[must_use]
    pub fn with_classification(mut self, stage_id: u32, classification: Classification) -> Self {
        self.classifications.insert(stage_id, classification);
        self
    }

    #[must_use]
    pub fn with_class_id(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    #[must_use]
    pub fn is_vehicle(&self) -> bool {
        self.stage_id == stage::VEHICLE_DETECTOR
    }

    #[must_use]
    pub fn is_plate(&self) -> bool {
        self.stage_id == stage::PLATE_DETECTOR
    }

    #[must_use]
    pub fn has_vehicle_class(&self) -> bool {
        self.class_id == VEHICLE_CLASS_ID
    }

    /// Label produced by the given classifier stage, if any
    #[must_use]
    pub fn label(&self, stage_id: u32) -> Option<&str> {
        self.classifications
            .get(&stage_id)
            .map(|c| c.label.as_str())
    }
}

/// Consolidated record attached to a frame for downstream transport.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDataRecord {
    vehicle_identity: u64,
    payload: String,
}

impl SideDataRecord {
    pub fn new(vehicle_identity: u64, payload: impl Into<String>) -> Self {
        Self {
            vehicle_identity,
            payload: payload.into(),
        }
    }

    #[must_use]
    pub fn vehicle_identity(&self) -> u64 {
        self.vehicle_identity
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// One frame of a batch with its detections and attached side-data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub frame_number: u64,
    #[serde(default)]
    pub source_id: u32,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
    #[serde(default)]
    pub side_data: Vec<SideDataRecord>,
}

impl Frame {
    #[must_use]
    pub fn with_objects(objects: Vec<DetectedObject>) -> Self {
        Self {
            objects,
            ..Default::default()
        }
    }

    /// Objects produced by the vehicle detector
    pub fn vehicles(&self) -> impl Iterator<Item = &DetectedObject> {
        self.objects.iter().filter(|o| o.is_vehicle())
    }

    /// Objects produced by the plate detector
    pub fn plates(&self) -> impl Iterator<Item = &DetectedObject> {
        self.objects.iter().filter(|o| o.is_plate())
    }
}

/// Frames produced together by the upstream collaborators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Batch {
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Total number of objects across all frames
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.frames.iter().map(|f| f.objects.len()).sum()
    }

    /// Validate region invariants of every object
    pub fn validate(&self) -> Result<()> {
        for (frame_idx, frame) in self.frames.iter().enumerate() {
            for object in &frame.objects {
                let r = &object.region;
                if r.left < 0.0 || r.top < 0.0 || r.width < 0.0 || r.height < 0.0 {
                    return Err(ProcessingError::InvalidBatch(format!(
                        "frame {} object {} has negative region {:?}",
                        frame_idx, object.identity, r
                    )));
                }
            }
        }
        Ok(())
    }
}
