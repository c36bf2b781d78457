//! Probe chain for the fusion stage

use crate::config::PipelineConfig;
use crate::probe::{AssociationProbe, ComposeProbe, GateProbe, Probe, ProbeReturn, RecordProbe};
use crate::stats::{PipelineStats, StatsSummary};
use lpr_fusion_common::Batch;
use lpr_fusion_recorder::DetectionRecorder;
use std::sync::Arc;
use tracing::{debug, info};

/// A batch after every probe has run
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedBatch {
    /// The batch with relinked plates and appended side data. Dropped
    /// batches are still returned for display.
    pub batch: Batch,

    /// Whether the batch continues to the message transport
    pub forward_to_transport: bool,
}

/// Association, composition, recording and gating in that order
pub struct FusionPipeline {
    probes: Vec<Box<dyn Probe>>,
    stats: Arc<PipelineStats>,
}

impl FusionPipeline {
    /// Build the pipeline and prepare the detection output directory
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::with_recorder(DetectionRecorder::new(&config.detection_output_dir))
    }

    /// Build the pipeline around an existing recorder
    pub fn with_recorder(recorder: DetectionRecorder) -> Self {
        recorder.prepare();

        let stats = Arc::new(PipelineStats::new());
        let probes: Vec<Box<dyn Probe>> = vec![
            Box::new(AssociationProbe::new(Arc::clone(&stats))),
            Box::new(ComposeProbe::new(Arc::clone(&stats))),
            Box::new(RecordProbe::new(recorder, Arc::clone(&stats))),
            Box::new(GateProbe::new(Arc::clone(&stats))),
        ];

        info!(
            "Fusion pipeline ready: {}",
            probes.iter().map(|p| p.name()).collect::<Vec<_>>().join(" -> ")
        );

        Self { probes, stats }
    }

    /// Run every probe on `batch`.
    ///
    /// A probe returning [`ProbeReturn::Drop`] stops the chain and marks the
    /// batch as not forwarded.
    pub fn process(&self, mut batch: Batch) -> ProcessedBatch {
        self.stats.record_batch(batch.frames.len());

        let mut forward_to_transport = true;
        for probe in &self.probes {
            if probe.process(&mut batch) == ProbeReturn::Drop {
                debug!("Probe '{}' dropped the batch", probe.name());
                forward_to_transport = false;
                break;
            }
        }

        ProcessedBatch {
            batch,
            forward_to_transport,
        }
    }

    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn stats(&self) -> StatsSummary {
        self.stats.summary()
    }

    pub fn log_summary(&self) {
        self.stats.log_summary();
    }
}
