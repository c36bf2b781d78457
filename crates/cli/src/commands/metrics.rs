//! Metrics command: score recorded detection files against COCO annotations

use anyhow::{Context as _, Result};
use clap::Args;
use lpr_fusion_metrics::{evaluate, EvaluationOptions, GroundTruth, MetricsSummary};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args)]
pub struct MetricsCommand {
    /// COCO annotations with `car` and `license_plate` categories
    #[arg(long, default_value = "data/annotations/instances_default.json")]
    coco: PathBuf,

    /// Directory of frame_NNNNNN.txt detection files
    #[arg(long, default_value = "logs/detections")]
    detections_dir: PathBuf,

    /// Detection file number = annotated frame index + offset
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    frame_offset: i64,

    /// Width the detections were recorded at
    #[arg(long, default_value_t = 1920)]
    detection_width: u32,

    /// Height the detections were recorded at
    #[arg(long, default_value_t = 1080)]
    detection_height: u32,

    /// Minimum IoU for a prediction to match an annotation
    #[arg(long, default_value_t = 0.5)]
    iou_threshold: f32,

    /// Also write the summary as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl MetricsCommand {
    pub fn execute(self) -> Result<()> {
        let options = EvaluationOptions {
            frame_offset: self.frame_offset,
            detection_width: self.detection_width,
            detection_height: self.detection_height,
            iou_threshold: self.iou_threshold,
        };
        let summary = compute_summary(&self.coco, &self.detections_dir, &options)?;

        println!("{summary}");
        if let Some(path) = &self.output {
            write_summary(&summary, path)?;
            info!("Wrote {}", path.display());
        }
        Ok(())
    }
}

/// Evaluate `detections_dir` against the annotations in `coco`
pub fn compute_summary(
    coco: &Path,
    detections_dir: &Path,
    options: &EvaluationOptions,
) -> Result<MetricsSummary> {
    if options.detection_width == 0 || options.detection_height == 0 {
        anyhow::bail!("Detection resolution must be non-zero");
    }
    if !coco.is_file() {
        anyhow::bail!("COCO annotations not found: {}", coco.display());
    }
    if !detections_dir.is_dir() {
        anyhow::bail!("Detections directory not found: {}", detections_dir.display());
    }

    let truth = GroundTruth::load(coco).context("Failed to load COCO annotations")?;
    let evaluation =
        evaluate(&truth, detections_dir, options).context("Failed to evaluate detections")?;
    Ok(evaluation.summary())
}

fn write_summary(summary: &MetricsSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
