//! Decode command: turn raw recognizer output into plate text

use crate::parser::parse_list;
use anyhow::{Context as _, Result};
use clap::Args;
use lpr_fusion_pipeline::PipelineConfig;
use lpr_fusion_plate_recognition::{PlateAttribute, PlateParser};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct DecodeCommand {
    /// Per-step class indices, e.g. "0,0,1,35,35,2"
    #[arg(value_name = "INDICES")]
    indices: String,

    /// Per-step confidences, same length as the indices
    #[arg(value_name = "CONFIDENCES")]
    confidences: String,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plate character dictionary
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Recognizer input width in pixels (time steps = width / 4)
    #[arg(long)]
    network_width: Option<u32>,
}

impl DecodeCommand {
    pub fn execute(self) -> Result<()> {
        let mut config = PipelineConfig::load(self.config.as_deref())
            .context("Failed to load config")?;
        if let Some(path) = self.dictionary {
            config.dictionary_path = path;
        }
        if let Some(width) = self.network_width {
            config.network_width = width;
        }
        config.validate().context("Invalid configuration")?;

        let plate = decode_plate(&config, &self.indices, &self.confidences)?;
        println!("{}", render(plate.as_ref()));
        if plate.is_none() {
            info!("No plate: fewer than the minimum number of characters decoded");
        }
        Ok(())
    }
}

/// Parse both value lists and decode them with the configured dictionary and
/// network width
pub fn decode_plate(
    config: &PipelineConfig,
    indices: &str,
    confidences: &str,
) -> Result<Option<PlateAttribute>> {
    let indices: Vec<i32> = parse_list(indices).context("Failed to parse class indices")?;
    let confidences: Vec<f32> = parse_list(confidences).context("Failed to parse confidences")?;
    if indices.len() != confidences.len() {
        anyhow::bail!(
            "Got {} class indices but {} confidences",
            indices.len(),
            confidences.len()
        );
    }

    let parser = PlateParser::new(&config.dictionary_path);
    parser.dictionary().with_context(|| {
        format!(
            "Failed to load dictionary {}",
            config.dictionary_path.display()
        )
    })?;

    Ok(parser.parse(&indices, &confidences, config.network_width))
}

fn render(plate: Option<&PlateAttribute>) -> serde_json::Value {
    match plate {
        Some(plate) => serde_json::json!({
            "label": plate.label,
            "confidence": plate.confidence,
        }),
        None => serde_json::Value::Null,
    }
}
