use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use nrmac_core::io::{FileRasterSource, GeoTiffSink};
use nrmac_core::pipeline::config::RunConfig;
use nrmac_core::pipeline::discovery::read_file_list;
use nrmac_core::pipeline::{run_batch, BatchStage, ProgressReporter};
use serde_json::Value;
use tracing::{debug, info};

use crate::summary::print_batch_summary;

#[derive(Args)]
pub struct RunArgs {
    /// Candidate files
    pub files: Vec<PathBuf>,

    /// Text file listing candidate files, one per line
    #[arg(long)]
    pub file_list: Option<PathBuf>,

    /// Run config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the quality rasters
    #[arg(short, long)]
    pub working_folder: Option<PathBuf>,

    /// Suffix selecting candidate images
    #[arg(long)]
    pub extension: Option<String>,

    /// Accumulated pipeline metadata (JSON object or array of objects)
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Directory with cached sensor metadata
    #[arg(long)]
    pub sensor_cache: Option<PathBuf>,

    /// Score files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Write the result JSON here instead of stdout
    #[arg(long)]
    pub result: Option<PathBuf>,
}

struct BarReporter {
    pb: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: BatchStage, total_items: Option<usize>) {
        self.pb.set_length(total_items.unwrap_or(0) as u64);
        self.pb.set_position(0);
        self.pb.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.pb.set_position(items_done as u64);
    }
}

fn load_config(args: &RunArgs) -> Result<RunConfig> {
    let mut config = if let Some(ref path) = args.config {
        RunConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?
    } else {
        RunConfig::default()
    };

    if let Some(ref folder) = args.working_folder {
        config.working_folder = folder.clone();
    }
    if let Some(ref ext) = args.extension {
        config.image_extension = ext.clone();
    }
    if let Some(ref cache) = args.sensor_cache {
        config.sensor_metadata_cache = Some(cache.clone());
    }
    if args.parallel {
        config.parallel = true;
    }
    debug!(?config, "Run configuration");
    Ok(config)
}

/// First record of the accumulated metadata.
fn load_system_metadata(args: &RunArgs) -> Result<Option<Value>> {
    let Some(ref path) = args.metadata else {
        return Ok(None);
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents).context("Invalid metadata JSON")?;
    Ok(match value {
        Value::Array(mut records) if !records.is_empty() => Some(records.swap_remove(0)),
        Value::Array(_) => None,
        other => Some(other),
    })
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = load_config(args)?;
    let system_metadata = load_system_metadata(args)?;

    let mut files = args.files.clone();
    if let Some(ref list) = args.file_list {
        files.extend(
            read_file_list(list)
                .with_context(|| format!("Failed to read file list {}", list.display()))?,
        );
    }

    info!(files = files.len(), "Collected candidate list");

    std::fs::create_dir_all(&config.working_folder).with_context(|| {
        format!(
            "Failed to create working folder {}",
            config.working_folder.display()
        )
    })?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:16} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = BarReporter { pb };

    let result = run_batch(
        &files,
        &config,
        system_metadata.as_ref(),
        &FileRasterSource,
        &GeoTiffSink,
        &reporter,
    );
    reporter.pb.finish_and_clear();
    let result = result?;

    let json = result.to_json_pretty()?;
    if let Some(ref path) = args.result {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write result to {}", path.display()))?;
    } else {
        println!("{}", json);
    }

    print_batch_summary(&config, &result);

    if !result.is_success() {
        bail!(
            "{}",
            result.error.as_deref().unwrap_or("Batch did not start")
        );
    }
    Ok(())
}
