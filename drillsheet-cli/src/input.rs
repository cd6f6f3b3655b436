//! Input and configuration resolution for the CLI.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use drillsheet_core::{ExtractionConfig, JsonPageDump, PipelineStages};
use tracing::{debug, info};

/// Environment variable naming a default config file.
pub const CONFIG_ENV: &str = "DRILLSHEET_CONFIG";

/// Read a page dump from `input`, or from stdin when `input` is `-`.
pub fn load_dump(input: &str) -> Result<JsonPageDump> {
    let dump = if input == "-" {
        JsonPageDump::from_reader("stdin", io::stdin().lock())?
    } else {
        JsonPageDump::from_path(Path::new(input))?
    };
    Ok(dump)
}

/// An explicit `--config` must load; a config named by the environment
/// falls back to defaults with a warning.
pub fn resolve_config(explicit: Option<&str>, from_env: Option<&str>) -> Result<ExtractionConfig> {
    match (explicit, from_env) {
        (Some(path), _) => {
            info!("Loading config from {}", path);
            Ok(ExtractionConfig::load_from_file(path)?)
        }
        (None, Some(path)) => {
            debug!("Loading config from ${}={}", CONFIG_ENV, path);
            Ok(ExtractionConfig::load_with_fallback(Some(path)))
        }
        (None, None) => Ok(ExtractionConfig::default()),
    }
}

/// Write every captured stage of one page as separate JSON files.
pub fn save_stages(stages: &PipelineStages, output_dir: &str) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create stage directory {output_dir}"))?;

    write_stage(output_dir, "stage1_lines.json", &stages.lines)?;
    write_stage(output_dir, "stage2_raw_blocks.json", &stages.raw_blocks)?;
    write_stage(output_dir, "stage3_blocks.json", &stages.blocks)?;
    write_stage(output_dir, "stage4_result.json", &stages.result)?;

    let summary = serde_json::json!({
        "text_source": stages.text_source,
        "stage_counts": {
            "lines": stages.lines.len(),
            "raw_blocks": stages.raw_blocks.len(),
            "blocks": stages.blocks.len(),
            "sheets": stages.result.sheets.len(),
            "diagnostics": stages.result.diagnostics.len(),
        }
    });
    write_stage(output_dir, "summary.json", &summary)
}

fn write_stage<T: serde::Serialize + ?Sized>(output_dir: &str, file: &str, value: &T) -> Result<()> {
    let path = Path::new(output_dir).join(file);
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}
