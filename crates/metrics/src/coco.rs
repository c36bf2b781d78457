//! COCO ground truth for cars and license plates

use crate::MetricsError;
use lpr_fusion_common::Region;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

const CAR_CATEGORY: &str = "car";
const PLATE_CATEGORY: &str = "license_plate";

fn default_width() -> u32 {
    3840
}

fn default_height() -> u32 {
    2160
}

/// The subset of a COCO instances file used for evaluation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CocoDataset {
    #[serde(default)]
    pub images: Vec<CocoImage>,
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CocoImage {
    pub id: u64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CocoAnnotation {
    pub image_id: u64,
    pub category_id: u64,
    /// `[x, y, width, height]`
    pub bbox: [f32; 4],
    #[serde(default)]
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
}

impl CocoAnnotation {
    #[must_use]
    pub fn region(&self) -> Region {
        let [x, y, w, h] = self.bbox;
        Region::new(x, y, w, h)
    }

    /// Plate text stored in the `value` attribute, or `""`
    #[must_use]
    pub fn plate_text(&self) -> &str {
        self.attributes
            .as_ref()
            .and_then(|attrs| attrs.get("value"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CocoCategory {
    pub id: u64,
    pub name: String,
}

/// Annotated license plate
#[derive(Debug, Clone, PartialEq)]
pub struct TruthPlate {
    pub region: Region,
    pub text: String,
}

/// Ground truth of one annotated image
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTruth {
    pub id: u64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub cars: Vec<Region>,
    pub plates: Vec<TruthPlate>,
}

/// Car and plate annotations grouped per image, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruth {
    pub images: Vec<ImageTruth>,
}

impl GroundTruth {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MetricsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| MetricsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, MetricsError> {
        let dataset: CocoDataset = serde_json::from_str(json)?;
        Ok(Self::from_dataset(dataset))
    }

    /// Group annotations by image. Annotations of other categories or of
    /// unknown images are ignored.
    #[must_use]
    pub fn from_dataset(dataset: CocoDataset) -> Self {
        let categories: HashMap<u64, &str> = dataset
            .categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let mut images: Vec<ImageTruth> = dataset
            .images
            .iter()
            .map(|img| ImageTruth {
                id: img.id,
                file_name: img.file_name.clone(),
                width: img.width,
                height: img.height,
                cars: Vec::new(),
                plates: Vec::new(),
            })
            .collect();
        let index: HashMap<u64, usize> = images
            .iter()
            .enumerate()
            .map(|(i, img)| (img.id, i))
            .collect();

        for ann in &dataset.annotations {
            let Some(&slot) = index.get(&ann.image_id) else {
                debug!("Annotation for unknown image {}", ann.image_id);
                continue;
            };
            let image = &mut images[slot];
            match categories.get(&ann.category_id).copied() {
                Some(CAR_CATEGORY) => image.cars.push(ann.region()),
                Some(PLATE_CATEGORY) => image.plates.push(TruthPlate {
                    region: ann.region(),
                    text: ann.plate_text().to_string(),
                }),
                _ => {}
            }
        }

        Self { images }
    }
}

/// Frame index encoded in an image file name: `frame_000042.png` gives 42
#[must_use]
pub fn frame_index_from_file_name(file_name: &str) -> Option<u64> {
    let rest = file_name.strip_prefix("frame_")?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, suffix) = rest.split_at(digits_end);

    let extension = suffix.strip_prefix('.')?;
    if !extension.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return None;
    }
    digits.parse().ok()
}
