//! Run command: stream JSON batches through the fusion pipeline

use anyhow::{Context as _, Result};
use clap::Args;
use lpr_fusion_common::Batch;
use lpr_fusion_pipeline::{FusionPipeline, PipelineConfig};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Args)]
pub struct RunCommand {
    /// JSON-lines file with one batch per line (stdin when omitted or `-`)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for per-frame detection files (empty string disables)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Plate character dictionary
    #[arg(long)]
    dictionary: Option<PathBuf>,
}

/// Line counts for one input stream
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub lines: usize,
    pub skipped: usize,
    pub forwarded: usize,
}

impl RunCommand {
    pub fn execute(self) -> Result<()> {
        let config = self.resolve_config()?;
        info!("=== LPR Fusion ===");
        info!("Dictionary: {}", config.dictionary_path.display());
        if config.recording_enabled() {
            info!("Detection output: {}", config.detection_output_dir.display());
        } else {
            info!("Detection recording disabled");
        }

        let pipeline = FusionPipeline::from_config(&config);
        let stdout = io::stdout();
        let mut out = stdout.lock();

        let summary = match self.input.as_deref() {
            Some(path) if path != Path::new("-") => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open input {}", path.display()))?;
                run_stream(&pipeline, BufReader::new(file), &mut out)?
            }
            _ => run_stream(&pipeline, io::stdin().lock(), &mut out)?,
        };

        info!(
            "Processed {} lines ({} skipped, {} forwarded)",
            summary.lines, summary.skipped, summary.forwarded
        );
        pipeline.log_summary();
        Ok(())
    }

    /// Config file, then environment, then command-line flags
    fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref()).with_context(|| {
            match &self.config {
                Some(path) => format!("Failed to load config {}", path.display()),
                None => "Failed to load config".to_string(),
            }
        })?;

        if let Some(dir) = &self.output_dir {
            config.detection_output_dir = dir.clone();
        }
        if let Some(path) = &self.dictionary {
            config.dictionary_path = path.clone();
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Process every batch line of `reader`, writing forwarded side-data records
/// to `writer` as JSON lines.
///
/// Malformed lines are logged and skipped. Only reader and writer IO errors
/// abort the stream.
pub fn run_stream<R: BufRead, W: Write>(
    pipeline: &FusionPipeline,
    reader: R,
    mut writer: W,
) -> Result<StreamSummary> {
    let mut summary = StreamSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.with_context(|| format!("Failed to read input line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }
        summary.lines += 1;

        let batch: Batch = match serde_json::from_str(&line) {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Skipping line {}: malformed batch: {}", line_number, e);
                summary.skipped += 1;
                continue;
            }
        };
        if let Err(e) = batch.validate() {
            warn!("Skipping line {}: {}", line_number, e);
            summary.skipped += 1;
            continue;
        }

        let processed = pipeline.process(batch);
        if !processed.forward_to_transport {
            debug!("Line {}: batch held back from transport", line_number);
            continue;
        }

        summary.forwarded += 1;
        for record in processed.batch.frames.iter().flat_map(|f| &f.side_data) {
            serde_json::to_writer(&mut writer, record).context("Failed to encode record")?;
            writeln!(writer).context("Failed to write record")?;
        }
    }

    writer.flush().context("Failed to flush output")?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpr_fusion_common::SideDataRecord;

    fn pipeline() -> FusionPipeline {
        let config = PipelineConfig {
            detection_output_dir: PathBuf::new(),
            ..PipelineConfig::default()
        };
        FusionPipeline::from_config(&config)
    }

    const VEHICLE_BATCH: &str = r#"{"frames":[{"frame_number":0,"objects":[{"stage_id":1,"identity":7,"region":{"left":0,"top":0,"width":100,"height":50},"classifications":{"2":{"label":"ford"}}}]}]}"#;

    #[test]
    fn test_forwarded_records_are_json_lines() {
        let input = format!("{VEHICLE_BATCH}\n\n");
        let mut output = Vec::new();

        let summary = run_stream(&pipeline(), input.as_bytes(), &mut output).unwrap();
        assert_eq!(summary.lines, 1);
        assert_eq!(summary.forwarded, 1);

        let text = String::from_utf8(output).unwrap();
        let records: Vec<SideDataRecord> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            records,
            vec![SideDataRecord::new(
                7,
                "Vehicle ID: 7, Brand: ford, Type: NULL, Plate: NULL"
            )]
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let input = format!("not json\n{VEHICLE_BATCH}\n{{\"frames\":[{{\"objects\":[{{\"stage_id\":1,\"identity\":1,\"region\":{{\"left\":-1,\"top\":0,\"width\":1,\"height\":1}}}}]}}]}}\n");
        let mut output = Vec::new();

        let summary = run_stream(&pipeline(), input.as_bytes(), &mut output).unwrap();
        assert_eq!(
            summary,
            StreamSummary {
                lines: 3,
                skipped: 2,
                forwarded: 1,
            }
        );
    }

    #[test]
    fn test_gated_batches_are_not_written() {
        let input = r#"{"frames":[{"objects":[]}]}"#;
        let mut output = Vec::new();

        let summary = run_stream(&pipeline(), input.as_bytes(), &mut output).unwrap();
        assert_eq!(summary.forwarded, 0);
        assert!(output.is_empty());
    }
}
