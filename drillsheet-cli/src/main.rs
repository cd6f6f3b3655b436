use std::sync::Arc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Import from drillsheet-core
use drillsheet_core::config::FieldProfile;
use drillsheet_core::serialization::write_output;
use drillsheet_core::{pages_to_json, OutputFormat, PageProcessor};

// Import CLI utilities
use drillsheet::{load_dump, resolve_config, save_stages, CONFIG_ENV};

#[derive(Parser)]
#[command(name = "drillsheet")]
#[command(about = "Extract performer coordinate sheets from drill chart page dumps")]
struct Args {
    /// Page dump JSON file, or `-` to read it from stdin
    input: String,

    /// Zero-based physical page to extract
    #[arg(short, long, default_value_t = 0, conflicts_with = "all_pages")]
    page: usize,

    /// Extract every page and emit an array of results
    #[arg(long)]
    all_pages: bool,

    /// Render DPI requested for OCR quadrants
    #[arg(long)]
    dpi: Option<u32>,

    /// Native text length at or below which the page is OCR'd instead
    #[arg(long)]
    threshold: Option<usize>,

    /// Vertical line-grouping tolerance in page units
    #[arg(long)]
    tolerance: Option<f32>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<String>,

    /// Output format: result or flat
    #[arg(short = 'f', long, default_value = "result")]
    format: OutputFormat,

    /// Resolve coordinates to steps on this field: high_school or college
    #[arg(long)]
    normalize_field: Option<FieldProfile>,

    /// Log per-step timings
    #[arg(long)]
    profile: bool,

    /// Dump every intermediate stage of the selected page to this directory
    #[arg(long)]
    dump_stages: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => fail(&usage_error(&e)),
    };
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        fail(&e.to_string());
    }
}

/// Print the `{"error": ...}` payload on stderr and exit with status 1.
fn fail(message: &str) -> ! {
    let payload = serde_json::json!({ "error": message });
    eprintln!("{payload}");
    std::process::exit(1);
}

/// First line of clap's rendered error, without the `error: ` prefix.
fn usage_error(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let env_config = std::env::var(CONFIG_ENV).ok();
    let mut config = resolve_config(args.config.as_deref(), env_config.as_deref())?;

    // Apply CLI overrides to config
    if let Some(dpi) = args.dpi {
        config.ocr_dpi = dpi;
    }
    if let Some(threshold) = args.threshold {
        config.min_text_length_threshold = threshold;
    }
    if let Some(tolerance) = args.tolerance {
        config.y_tolerance = tolerance;
    }
    if let Some(field) = args.normalize_field {
        config.coordinates.enabled = true;
        config.coordinates.field = field;
    }

    let dump = Arc::new(load_dump(&args.input)?);
    let processor = PageProcessor::new(config)?
        .with_ocr_engine(dump.clone())
        .with_profiling(args.profile);

    if let Some(stages_dir) = &args.dump_stages {
        let stages = processor.process_page_capture_stages(dump.as_ref(), args.page)?;
        save_stages(&stages, stages_dir)?;
        info!("All stages dumped to {}", stages_dir);
    }

    if args.all_pages {
        let results = processor.process_pages(dump.as_ref())?;
        let json = pages_to_json(&results, args.format)?;
        match &args.output {
            Some(path) => {
                write_output(path, &json)
                    .with_context(|| format!("Failed to save results to {path}"))?;
                info!("{} results for {} pages saved to {}", args.format, results.len(), path);
            }
            None => println!("{json}"),
        }
    } else {
        let result = processor.process_page(dump.as_ref(), args.page)?;
        match &args.output {
            Some(path) => {
                result
                    .save_with_format(path, args.format)
                    .with_context(|| format!("Failed to save results to {path}"))?;
                info!("{} results saved to {}", args.format, path);
            }
            None => println!("{}", result.to_json_with_format(args.format)?),
        }
    }

    Ok(())
}
