//! Running counters for a fusion pipeline

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Counters shared by the probes of one pipeline
#[derive(Debug, Default)]
pub struct PipelineStats {
    batches: AtomicU64,
    frames: AtomicU64,
    relinks: AtomicU64,
    records_composed: AtomicU64,
    files_recorded: AtomicU64,
    batches_dropped: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub batches: u64,
    pub frames: u64,
    pub relinks: u64,
    pub records_composed: u64,
    pub files_recorded: u64,
    pub batches_dropped: u64,
}

fn add(counter: &AtomicU64, n: usize) {
    counter.fetch_add(n as u64, Ordering::Relaxed);
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_batch(&self, frames: usize) {
        add(&self.batches, 1);
        add(&self.frames, frames);
    }

    pub fn record_relinks(&self, n: usize) {
        add(&self.relinks, n);
    }

    pub fn record_composed(&self, n: usize) {
        add(&self.records_composed, n);
    }

    pub fn record_files(&self, n: usize) {
        add(&self.files_recorded, n);
    }

    pub fn record_dropped(&self) {
        add(&self.batches_dropped, 1);
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            batches: self.batches.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            relinks: self.relinks.load(Ordering::Relaxed),
            records_composed: self.records_composed.load(Ordering::Relaxed),
            files_recorded: self.files_recorded.load(Ordering::Relaxed),
            batches_dropped: self.batches_dropped.load(Ordering::Relaxed),
        }
    }

    /// Log the current counters at INFO level
    pub fn log_summary(&self) {
        let s = self.summary();
        info!("=== Fusion Summary ===");
        info!("Batches: {} ({} dropped)", s.batches, s.batches_dropped);
        info!("Frames: {}", s.frames);
        info!("Plates relinked: {}", s.relinks);
        info!("Side-data records: {}", s.records_composed);
        info!("Detection files: {}", s.files_recorded);
    }
}
