//! Buffer probes run on every batch

use crate::stats::PipelineStats;
use lpr_fusion::{compose_batch, gate_batch, GateDecision};
use lpr_fusion_association::associate_batch;
use lpr_fusion_common::Batch;
use lpr_fusion_recorder::DetectionRecorder;
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of a probe for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeReturn {
    /// Let the batch continue downstream
    Pass,
    /// Stop the batch at this probe
    Drop,
}

/// A stage that inspects or mutates batches in place
pub trait Probe: Send + Sync {
    /// Probe identifier used in logs
    fn name(&self) -> &str;

    fn process(&self, batch: &mut Batch) -> ProbeReturn;
}

/// Re-parents plates onto the vehicle they overlap most
pub struct AssociationProbe {
    stats: Arc<PipelineStats>,
}

impl AssociationProbe {
    pub fn new(stats: Arc<PipelineStats>) -> Self {
        Self { stats }
    }
}

impl Probe for AssociationProbe {
    fn name(&self) -> &str {
        "association"
    }

    fn process(&self, batch: &mut Batch) -> ProbeReturn {
        let relinked = associate_batch(batch);
        trace!("{} plates relinked", relinked);
        self.stats.record_relinks(relinked);
        ProbeReturn::Pass
    }
}

/// Appends one side-data record per vehicle and plate
pub struct ComposeProbe {
    stats: Arc<PipelineStats>,
}

impl ComposeProbe {
    pub fn new(stats: Arc<PipelineStats>) -> Self {
        Self { stats }
    }
}

impl Probe for ComposeProbe {
    fn name(&self) -> &str {
        "compose"
    }

    fn process(&self, batch: &mut Batch) -> ProbeReturn {
        let composed = compose_batch(batch);
        self.stats.record_composed(composed);
        ProbeReturn::Pass
    }
}

/// Writes the per-frame detection files
pub struct RecordProbe {
    recorder: DetectionRecorder,
    stats: Arc<PipelineStats>,
}

impl RecordProbe {
    pub fn new(recorder: DetectionRecorder, stats: Arc<PipelineStats>) -> Self {
        Self { recorder, stats }
    }
}

impl Probe for RecordProbe {
    fn name(&self) -> &str {
        "record"
    }

    fn process(&self, batch: &mut Batch) -> ProbeReturn {
        let written = self.recorder.record_batch(batch);
        self.stats.record_files(written.len());
        ProbeReturn::Pass
    }
}

/// Drops batches that contain a frame without detections
pub struct GateProbe {
    stats: Arc<PipelineStats>,
}

impl GateProbe {
    pub fn new(stats: Arc<PipelineStats>) -> Self {
        Self { stats }
    }
}

impl Probe for GateProbe {
    fn name(&self) -> &str {
        "gate"
    }

    fn process(&self, batch: &mut Batch) -> ProbeReturn {
        match gate_batch(batch) {
            GateDecision::Forward => ProbeReturn::Pass,
            GateDecision::Drop => {
                debug!("Dropping batch of {} frames", batch.frames.len());
                self.stats.record_dropped();
                ProbeReturn::Drop
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpr_fusion_common::{DetectedObject, Frame, Region};

    fn batch_with_plate() -> Batch {
        Batch::new(vec![Frame::with_objects(vec![
            DetectedObject::vehicle(5, Region::new(0.0, 0.0, 100.0, 100.0)),
            DetectedObject::plate(99, Region::new(10.0, 10.0, 20.0, 20.0)),
        ])])
    }

    #[test]
    fn test_association_probe_counts_relinks() {
        let stats = Arc::new(PipelineStats::new());
        let probe = AssociationProbe::new(Arc::clone(&stats));
        let mut batch = batch_with_plate();

        assert_eq!(probe.process(&mut batch), ProbeReturn::Pass);
        assert_eq!(batch.frames[0].objects[1].identity, 5);
        assert_eq!(stats.summary().relinks, 1);
    }

    #[test]
    fn test_compose_probe_appends_records() {
        let stats = Arc::new(PipelineStats::new());
        let probe = ComposeProbe::new(Arc::clone(&stats));
        let mut batch = batch_with_plate();

        probe.process(&mut batch);
        assert_eq!(batch.frames[0].side_data.len(), 2);
        assert_eq!(stats.summary().records_composed, 2);
    }

    #[test]
    fn test_disabled_record_probe_passes() {
        let stats = Arc::new(PipelineStats::new());
        let probe = RecordProbe::new(DetectionRecorder::disabled(), Arc::clone(&stats));
        let mut batch = batch_with_plate();

        assert_eq!(probe.process(&mut batch), ProbeReturn::Pass);
        assert_eq!(stats.summary().files_recorded, 0);
    }

    #[test]
    fn test_gate_probe_drops_empty_frame() {
        let stats = Arc::new(PipelineStats::new());
        let probe = GateProbe::new(Arc::clone(&stats));

        let mut empty = Batch::new(vec![Frame::default()]);
        assert_eq!(probe.process(&mut empty), ProbeReturn::Drop);

        let mut full = batch_with_plate();
        assert_eq!(probe.process(&mut full), ProbeReturn::Pass);
        assert_eq!(stats.summary().batches_dropped, 1);
        assert_eq!(probe.name(), "gate");
    }
}
