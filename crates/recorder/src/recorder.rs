//! Per-frame detection files

use crate::counter::FrameCounter;
use crate::format::format_general;
use crate::{RecorderError, RecorderResult};
use lpr_fusion_common::{stage, Batch, DetectedObject, Frame, Region};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Placeholder written when no plate text is known
pub const MISSING_PLATE: &str = "-";

/// File name of the audit file for frame `number`
#[must_use]
pub fn frame_file_name(number: u64) -> String {
    format!("frame_{number:06}.txt")
}

fn non_empty_label(object: &DetectedObject) -> Option<&str> {
    object
        .label(stage::PLATE_RECOGNIZER)
        .filter(|label| !label.is_empty())
}

/// Plate text of a plate object, read from its own recognizer label
fn plate_text_of_plate(plate: &DetectedObject) -> &str {
    non_empty_label(plate).unwrap_or(MISSING_PLATE)
}

/// Plate text of a vehicle: the label of the first plate sharing its identity
fn plate_text_of_vehicle<'a>(frame: &'a Frame, vehicle: &DetectedObject) -> &'a str {
    frame
        .plates()
        .find(|p| p.identity == vehicle.identity)
        .map_or(MISSING_PLATE, plate_text_of_plate)
}

fn render_line(kind: &str, region: &Region, plate_text: &str) -> String {
    format!(
        "{} {} {} {} {} {}",
        kind,
        format_general(f64::from(region.left)),
        format_general(f64::from(region.top)),
        format_general(f64::from(region.width)),
        format_general(f64::from(region.height)),
        plate_text
    )
}

/// Audit lines for one frame: every vehicle first, then every plate
#[must_use]
pub fn render_lines(frame: &Frame) -> Vec<String> {
    let cars = frame
        .vehicles()
        .filter(|o| o.has_vehicle_class())
        .map(|car| render_line("car", &car.region, plate_text_of_vehicle(frame, car)));

    let plates = frame
        .plates()
        .filter(|o| o.has_vehicle_class())
        .map(|plate| render_line("plate", &plate.region, plate_text_of_plate(plate)));

    cars.chain(plates).collect()
}

/// Writes `frame_NNNNNN.txt` files under an output directory
#[derive(Debug, Clone)]
pub struct DetectionRecorder {
    output_dir: Option<PathBuf>,
    counter: Arc<FrameCounter>,
}

impl DetectionRecorder {
    /// Recorder writing under `output_dir`. An empty path disables recording.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            output_dir: (!output_dir.as_os_str().is_empty()).then_some(output_dir),
            counter: FrameCounter::process_wide(),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(PathBuf::new())
    }

    /// Use `counter` instead of the process-wide counter
    #[must_use]
    pub fn with_counter(mut self, counter: Arc<FrameCounter>) -> Self {
        self.counter = counter;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.output_dir.is_some()
    }

    #[must_use]
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Create the output directory and its parents. Returns false (after
    /// logging) if it could not be created.
    pub fn prepare(&self) -> bool {
        let Some(dir) = &self.output_dir else {
            return true;
        };
        match std::fs::create_dir_all(dir) {
            Ok(()) => {
                info!("Recording detections to {}", dir.display());
                true
            }
            Err(e) => {
                warn!(
                    "Could not create detection output dir {}: {}",
                    dir.display(),
                    e
                );
                false
            }
        }
    }

    /// Write the audit file for one frame.
    ///
    /// Returns the path written, or `None` when recording is disabled or the
    /// file could not be written. The counter advances for every attempted
    /// file, so a failed frame never shares its number with a later one.
    pub fn record_frame(&self, frame: &Frame) -> Option<PathBuf> {
        let dir = self.output_dir.as_ref()?;

        let number = self.counter.next();
        let path = dir.join(frame_file_name(number));

        match write_lines(&path, &render_lines(frame)) {
            Ok(()) => {
                debug!(
                    "Recorded {} detections to {}",
                    frame.objects.len(),
                    path.display()
                );
                Some(path)
            }
            Err(e) => {
                warn!("Skipping detection record: {}", e);
                None
            }
        }
    }

    /// Record every frame of a batch, returning the paths written
    pub fn record_batch(&self, batch: &Batch) -> Vec<PathBuf> {
        if !self.is_enabled() {
            return Vec::new();
        }
        batch
            .frames
            .iter()
            .filter_map(|frame| self.record_frame(frame))
            .collect()
    }
}

fn write_lines(path: &Path, lines: &[String]) -> RecorderResult<()> {
    let file = File::create(path).map_err(|source| RecorderError::Create {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let write_err = |source| RecorderError::Write {
        path: path.display().to_string(),
        source,
    };
    for line in lines {
        writeln!(writer, "{line}").map_err(write_err)?;
    }
    writer.flush().map_err(write_err)
}
