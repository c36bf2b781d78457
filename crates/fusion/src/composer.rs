//! Consolidated message composition

use lpr_fusion_common::{stage, Batch, DetectedObject, Frame, SideDataRecord};
use tracing::debug;

/// Placeholder rendered for a label no classifier produced
pub const MISSING_FIELD: &str = "NULL";

/// Render the consolidated payload for one vehicle identity
#[must_use]
pub fn render_payload(
    identity: u64,
    brand: Option<&str>,
    vehicle_type: Option<&str>,
    plate: Option<&str>,
) -> String {
    format!(
        "Vehicle ID: {}, Brand: {}, Type: {}, Plate: {}",
        identity,
        brand.unwrap_or(MISSING_FIELD),
        vehicle_type.unwrap_or(MISSING_FIELD),
        plate.unwrap_or(MISSING_FIELD)
    )
}

fn is_messaged(object: &DetectedObject) -> bool {
    object.has_vehicle_class() && (object.is_vehicle() || object.is_plate())
}

fn record_for(object: &DetectedObject) -> SideDataRecord {
    let payload = render_payload(
        object.identity,
        object.label(stage::BRAND_CLASSIFIER),
        object.label(stage::TYPE_CLASSIFIER),
        object.label(stage::PLATE_RECOGNIZER),
    );
    SideDataRecord::new(object.identity, payload)
}

/// Build one record per vehicle or plate detection, in frame order.
///
/// Labels are read from each object's own classifications: a vehicle usually
/// carries brand and type, a plate carries its text.
#[must_use]
pub fn build_records(frame: &Frame) -> Vec<SideDataRecord> {
    frame
        .objects
        .iter()
        .filter(|o| is_messaged(o))
        .map(record_for)
        .collect()
}

/// Append records for `frame` to its side-data. Not deduplicated: calling it
/// twice attaches every record twice.
pub fn compose_frame(frame: &mut Frame) -> usize {
    let records = build_records(frame);
    let count = records.len();
    for record in &records {
        debug!("Composed message: {}", record.payload());
    }
    frame.side_data.extend(records);
    count
}

/// Run [`compose_frame`] on every frame of a batch
pub fn compose_batch(batch: &mut Batch) -> usize {
    batch.frames.iter_mut().map(compose_frame).sum()
}
