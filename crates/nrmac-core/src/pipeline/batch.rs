use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Local;
use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::consts::QUALITY_FILE_SUFFIX;
use crate::error::NrmacError;
use crate::io::geotiff::quality_bounds;
use crate::io::{QualitySink, RasterSource};
use crate::metadata::{
    load_sensor_metadata, RasterDescription, TransformerMetadata, TRANSFORMER_SENSOR,
};
use crate::quality;

use super::config::RunConfig;
use super::discovery::{candidate_files, check_continue};
use super::result::{utc_timestamp, BatchResult, OutputFile, ProcessingSummary};
use super::types::{BatchStage, ProgressReporter};

/// One successfully scored source file.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub score: f64,
    pub utc_timestamp: String,
}

/// Why a single file was skipped. Never aborts the batch.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("unable to access file '{0}'")]
    Missing(PathBuf),

    #[error("failed to decode '{path}': {source}")]
    Decode { path: PathBuf, source: NrmacError },

    #[error("failed to score '{path}': {source}")]
    Score { path: PathBuf, source: NrmacError },

    #[error("failed to read bounds of '{path}': {source}")]
    Bounds { path: PathBuf, source: NrmacError },

    #[error("failed to write quality raster '{path}': {source}")]
    Write { path: PathBuf, source: NrmacError },
}

/// Per-run values shared by every file of a batch.
#[derive(Clone, Debug)]
pub struct BatchContext {
    pub working_folder: PathBuf,
    /// JSON stored in each quality raster's description tag.
    pub description: String,
}

impl BatchContext {
    /// Assemble the context for `config`, embedding the transformer identity,
    /// cached sensor metadata and the first accumulated pipeline record.
    pub fn new(config: &RunConfig, system_metadata: Option<&Value>) -> crate::error::Result<Self> {
        let transformer = TransformerMetadata::generate();
        let cache = config.sensor_metadata_cache.as_deref();
        let sensor = match load_sensor_metadata(cache, TRANSFORMER_SENSOR) {
            Ok(sensor) => sensor,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable sensor metadata cache");
                None
            }
        };
        let description = RasterDescription {
            transformer: &transformer,
            sensor: sensor.as_ref(),
            system: system_metadata,
        };

        Ok(Self {
            working_folder: config.working_folder.clone(),
            description: description.to_json()?,
        })
    }
}

/// Path of the quality raster produced for `source`.
pub fn quality_output_path(working_folder: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    working_folder.join(format!("{stem}{QUALITY_FILE_SUFFIX}"))
}

/// Score one file and write its quality raster.
pub fn process_file(
    path: &Path,
    ctx: &BatchContext,
    source: &dyn RasterSource,
    sink: &dyn QualitySink,
) -> Result<ScoredFile, ProcessingError> {
    debug!(file = %path.display(), "Processing file");
    if !path.exists() {
        return Err(ProcessingError::Missing(path.to_path_buf()));
    }

    let raster = source.load(path).map_err(|e| ProcessingError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;
    let score = quality::score(&raster).map_err(|e| ProcessingError::Score {
        path: path.to_path_buf(),
        source: e,
    })?;
    let bounds = source.bounds(path).map_err(|e| ProcessingError::Bounds {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raster_bounds = quality_bounds(&bounds);
    let output = quality_output_path(&ctx.working_folder, path);

    info!(score, file = %path.display(), "MAC score");
    debug!(bounds = ?raster_bounds, output = %output.display(), "Creating quality image");
    sink.write(&output, score, &raster_bounds, &ctx.description)
        .map_err(|e| ProcessingError::Write {
            path: output.clone(),
            source: e,
        })?;

    Ok(ScoredFile {
        source: path.to_path_buf(),
        output,
        score,
        utc_timestamp: utc_timestamp(),
    })
}

/// Score every candidate in `files`, skipping files that fail.
///
/// Results keep the order of `files` even when scoring runs in parallel.
/// Only a failure to assemble the shared raster description aborts the run.
pub fn process_batch(
    files: &[PathBuf],
    config: &RunConfig,
    system_metadata: Option<&Value>,
    source: &dyn RasterSource,
    sink: &dyn QualitySink,
    reporter: &dyn ProgressReporter,
) -> crate::error::Result<BatchResult> {
    let started = Local::now();

    reporter.begin_stage(BatchStage::Discovery, Some(files.len()));
    let candidates = candidate_files(files, &config.image_extension);
    reporter.finish_stage();
    info!(
        received = files.len(),
        images = candidates.len(),
        "Starting batch"
    );

    let ctx = BatchContext::new(config, system_metadata)?;
    let done = AtomicUsize::new(0);
    let handle = |path: &PathBuf| {
        let outcome = process_file(path, &ctx, source, sink);
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
        outcome
    };

    reporter.begin_stage(BatchStage::Scoring, Some(candidates.len()));
    let outcomes: Vec<Result<ScoredFile, ProcessingError>> = if config.parallel {
        candidates.par_iter().map(handle).collect()
    } else {
        candidates.iter().map(handle).collect()
    };
    reporter.finish_stage();

    let mut output_files = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(scored) => output_files.push(OutputFile::from(&scored)),
            Err(ProcessingError::Missing(path)) => {
                error!(file = %path.display(), "Unable to access file. Continuing processing");
            }
            Err(e) => {
                warn!(error = %e, "Ignoring error caught processing image file");
                debug!(detail = ?e, "Processing error");
            }
        }
    }

    let summary = ProcessingSummary::new(
        Local::now() - started,
        files.len(),
        candidates.len(),
        output_files.len(),
    );
    info!(
        processed = summary.num_processed_files,
        images = summary.num_image_files,
        "Batch complete"
    );
    Ok(BatchResult::success(output_files, summary))
}

/// Run the pre-flight check, then the batch.
pub fn run_batch(
    files: &[PathBuf],
    config: &RunConfig,
    system_metadata: Option<&Value>,
    source: &dyn RasterSource,
    sink: &dyn QualitySink,
    reporter: &dyn ProgressReporter,
) -> crate::error::Result<BatchResult> {
    if let Err(e) = check_continue(files, &config.image_extension) {
        error!(error = %e, "Batch not started");
        return Ok(BatchResult::failure(e.to_string()));
    }
    process_batch(files, config, system_metadata, source, sink, reporter)
}
