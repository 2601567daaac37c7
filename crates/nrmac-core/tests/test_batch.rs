mod common;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use approx::assert_relative_eq;
use serde_json::json;

use nrmac_core::error::{NrmacError, Result};
use nrmac_core::io::{FileRasterSource, GeoTiffSink, QualitySink, RasterSource};
use nrmac_core::metadata::TRANSFORMER_NAME;
use nrmac_core::pipeline::batch::quality_output_path;
use nrmac_core::pipeline::config::RunConfig;
use nrmac_core::pipeline::{
    process_file, run_batch, BatchContext, NoOpReporter, ProcessingError, ProgressReporter,
};
use nrmac_core::quality::score;
use nrmac_core::raster::Raster;

use common::{row_ramp, textured_rgb, write_rgb_geotiff};

/// Source returning a fixed raster for every path.
struct FixedSource(Raster);

impl RasterSource for FixedSource {
    fn load(&self, _path: &Path) -> Result<Raster> {
        Ok(self.0.clone())
    }

    fn bounds(&self, _path: &Path) -> Result<[f64; 4]> {
        Ok([1.0, 2.0, 3.0, 4.0])
    }
}

/// Sink remembering what it was asked to write.
#[derive(Default)]
struct RecordingSink {
    writes: Mutex<Vec<(PathBuf, f64, [f64; 4])>>,
}

impl QualitySink for RecordingSink {
    fn write(&self, path: &Path, score: f64, bounds: &[f64; 4], _description: &str) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), score, *bounds));
        Ok(())
    }
}

struct FailingSink;

impl QualitySink for FailingSink {
    fn write(&self, _path: &Path, _score: f64, _bounds: &[f64; 4], _description: &str) -> Result<()> {
        Err(NrmacError::Io(std::io::Error::other("disk full")))
    }
}

#[derive(Default)]
struct CountingReporter {
    last: Mutex<usize>,
}

impl ProgressReporter for CountingReporter {
    fn advance(&self, items_done: usize) {
        let mut last = self.last.lock().unwrap();
        *last = (*last).max(items_done);
    }
}

fn config_for(dir: &Path) -> RunConfig {
    RunConfig {
        working_folder: dir.to_path_buf(),
        ..Default::default()
    }
}

#[test]
fn test_empty_file_list_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_batch(
        &[],
        &config_for(dir.path()),
        None,
        &FileRasterSource,
        &GeoTiffSink,
        &NoOpReporter,
    )
    .unwrap();

    assert_eq!(result.code, -1);
    assert_eq!(
        result.error.as_deref(),
        Some("No supported image files were specified for processing")
    );
    assert!(result.files.is_empty());
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());

    let value: serde_json::Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "code": -1,
            "error": "No supported image files were specified for processing"
        })
    );
}

#[test]
fn test_no_matching_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")];
    let result = run_batch(
        &files,
        &config_for(dir.path()),
        None,
        &FileRasterSource,
        &GeoTiffSink,
        &NoOpReporter,
    )
    .unwrap();
    assert!(!result.is_success());
}

#[test]
fn test_missing_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let raster = textured_rgb(16, 12);
    let c = dir.path().join("c.tif");
    write_rgb_geotiff(&c, &raster, (100.0, 200.0), (1.0, 1.0));

    let files = vec![
        dir.path().join("a.tif"),
        dir.path().join("b.png"),
        c.clone(),
    ];
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let reporter = CountingReporter::default();
    let result = run_batch(
        &files,
        &config_for(&out),
        None,
        &FileRasterSource,
        &GeoTiffSink,
        &reporter,
    )
    .unwrap();

    assert_eq!(result.code, 0);
    assert_eq!(result.files.len(), 1);
    assert_eq!(*reporter.last.lock().unwrap(), 2);

    let scored = &result.files[0];
    assert_eq!(scored.key, "tif");
    assert_eq!(scored.path, out.join("c_mac.tif").display().to_string());
    assert_eq!(scored.metadata.data.source_file, c.display().to_string());
    assert!(scored.metadata.replace);
    assert_eq!(scored.metadata.data.mac_score, score(&raster).unwrap());
    assert!(out.join("c_mac.tif").exists());

    let summary = result.processing_summary().unwrap();
    assert_eq!(summary.num_files_received, 3);
    assert_eq!(summary.num_image_files, 2);
    assert_eq!(summary.num_processed_files, 1);
}

#[test]
fn test_undecodable_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.tif");
    std::fs::write(&broken, b"not a tiff").unwrap();
    let good = dir.path().join("good.tif");
    write_rgb_geotiff(&good, &textured_rgb(10, 10), (0.0, 10.0), (1.0, 1.0));

    let result = run_batch(
        &[broken, good],
        &config_for(dir.path()),
        None,
        &FileRasterSource,
        &GeoTiffSink,
        &NoOpReporter,
    )
    .unwrap();

    assert_eq!(result.code, 0);
    let summary = result.processing_summary().unwrap();
    assert_eq!(summary.num_image_files, 2);
    assert_eq!(summary.num_processed_files, 1);
}

#[test]
fn test_small_image_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let small = dir.path().join("small.tif");
    std::fs::write(&small, b"").unwrap();

    let sink = RecordingSink::default();
    let ctx = BatchContext::new(&config_for(dir.path()), None).unwrap();
    let source = FixedSource(row_ramp(&[1, 2, 3], 4));
    let err = process_file(&small, &ctx, &source, &sink).unwrap_err();

    assert!(matches!(
        err,
        ProcessingError::Score {
            source: NrmacError::ImageTooSmall { .. },
            ..
        }
    ));
    assert!(sink.writes.lock().unwrap().is_empty());
}

#[test]
fn test_sink_receives_reordered_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plot.tif");
    std::fs::write(&input, b"").unwrap();

    let raster = textured_rgb(9, 9);
    let expected = score(&raster).unwrap();
    let sink = RecordingSink::default();
    let ctx = BatchContext::new(&config_for(dir.path()), None).unwrap();
    let scored = process_file(&input, &ctx, &FixedSource(raster), &sink).unwrap();

    assert_relative_eq!(scored.score, expected);
    let writes = sink.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, dir.path().join("plot_mac.tif"));
    assert_eq!(writes[0].1, expected);
    assert_eq!(writes[0].2, [3.0, 4.0, 1.0, 2.0]);
}

#[test]
fn test_write_failure_is_classified() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plot.tif");
    std::fs::write(&input, b"").unwrap();

    let ctx = BatchContext::new(&config_for(dir.path()), None).unwrap();
    let err = process_file(&input, &ctx, &FixedSource(textured_rgb(8, 8)), &FailingSink)
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Write { .. }));
}

#[test]
fn test_parallel_batch_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<PathBuf> = (0..12)
        .map(|i| {
            let path = dir.path().join(format!("img{i:02}.tif"));
            std::fs::write(&path, b"").unwrap();
            path
        })
        .collect();

    let config = RunConfig {
        parallel: true,
        ..config_for(dir.path())
    };
    let sink = RecordingSink::default();
    let result = run_batch(
        &files,
        &config,
        Some(&json!({"season": 4})),
        &FixedSource(textured_rgb(8, 8)),
        &sink,
        &NoOpReporter,
    )
    .unwrap();

    let sources: Vec<String> = result
        .files
        .iter()
        .map(|f| f.metadata.data.source_file.clone())
        .collect();
    let expected: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
    assert_eq!(sources, expected);
}

#[test]
fn test_result_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plot.tif");
    std::fs::write(&input, b"").unwrap();

    let result = run_batch(
        &[input],
        &config_for(dir.path()),
        None,
        &FixedSource(textured_rgb(8, 8)),
        &RecordingSink::default(),
        &NoOpReporter,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();

    assert_eq!(value["code"], 0);
    assert!(value.get("error").is_none());
    assert_eq!(value["files"][0]["key"], "tif");
    assert!(value["files"][0]["metadata"]["data"]["MAC score"].is_string());
    let summary = &value[TRANSFORMER_NAME];
    assert_eq!(summary["version"], "2.0");
    assert_eq!(summary["num_files_received"], "1");
    assert_eq!(summary["num_image_files"], "1");
    assert_eq!(summary["num_processed_files"], "1");
    assert!(summary["processing_time"].as_str().unwrap().starts_with("0:00:"));
}

#[test]
fn test_batch_without_output_still_lists_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.tif");

    let result = run_batch(
        &[missing],
        &config_for(dir.path()),
        None,
        &FileRasterSource,
        &GeoTiffSink,
        &NoOpReporter,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();

    assert_eq!(value["code"], 0);
    assert_eq!(value["files"], json!([]));
    assert_eq!(value[TRANSFORMER_NAME]["num_processed_files"], "0");
}

#[test]
fn test_context_description_embeds_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = BatchContext::new(&config_for(dir.path()), Some(&json!({"season": 4}))).unwrap();

    let description: serde_json::Value = serde_json::from_str(&ctx.description).unwrap();
    assert_eq!(description["transformer"]["name"], TRANSFORMER_NAME);
    assert_eq!(description["system"]["season"], 4);
    assert!(description.get("sensor").is_none());
}

#[test]
fn test_quality_output_path() {
    assert_eq!(
        quality_output_path(Path::new("/work"), Path::new("/data/2018/plot.7.tif")),
        PathBuf::from("/work/plot.7_mac.tif")
    );
}
