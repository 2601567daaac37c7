use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

/// Short name of the transformer; also the key of the run summary.
pub const TRANSFORMER_NAME: &str = "terra.stereo-rgb.nrmac";

pub const TRANSFORMER_VERSION: &str = "2.0";

pub const TRANSFORMER_DESCRIPTION: &str = "Stereo RGB No-Reference Multiscale Autocorrelation";

/// Sensor whose captures this transformer scores.
pub const TRANSFORMER_SENSOR: &str = "stereoTop";

pub const TRANSFORMER_TYPE: &str = "quality metric";

pub const AUTHOR_NAME: &str = "Chris Schnaufer";

pub const AUTHOR_EMAIL: &str = "schnaufer@email.arizona.edu";

pub const CONTRIBUTORS: &[&str] = &["Sidike Paheding <sidike.paheding@slu.edu>"];

pub const REPOSITORY: &str = "https://github.com/AgPipeline/transformer-rgb_quality.git";

/// Identity of the transformer, embedded in every quality raster.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TransformerMetadata {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub sensor: &'static str,
    #[serde(rename = "type")]
    pub transformer_type: &'static str,
    pub author: String,
    pub contributors: Vec<&'static str>,
    pub repository: &'static str,
}

impl TransformerMetadata {
    pub fn generate() -> Self {
        Self {
            name: TRANSFORMER_NAME,
            version: TRANSFORMER_VERSION,
            description: TRANSFORMER_DESCRIPTION,
            sensor: TRANSFORMER_SENSOR,
            transformer_type: TRANSFORMER_TYPE,
            author: format!("{AUTHOR_NAME} <{AUTHOR_EMAIL}>"),
            contributors: CONTRIBUTORS.to_vec(),
            repository: REPOSITORY,
        }
    }
}

/// Look up cached fixed metadata for `sensor`.
///
/// Returns `Ok(None)` when no cache directory is configured or the cache has
/// no `<sensor>.json` entry.
pub fn load_sensor_metadata(cache_dir: Option<&Path>, sensor: &str) -> Result<Option<Value>> {
    let Some(dir) = cache_dir else {
        return Ok(None);
    };
    let path = dir.join(format!("{sensor}.json"));
    if !path.is_file() {
        debug!(path = %path.display(), "No cached sensor metadata");
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Everything embedded in a quality raster's `ImageDescription` tag.
#[derive(Clone, Debug, Serialize)]
pub struct RasterDescription<'a> {
    pub transformer: &'a TransformerMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a Value>,
}

impl RasterDescription<'_> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
