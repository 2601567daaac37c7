use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_IMAGE_EXTENSION;
use crate::error::Result;

/// Settings for one batch run. Loaded once at start-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Suffix a listed file must end with to be scored.
    pub image_extension: String,
    /// Directory receiving the quality rasters.
    pub working_folder: PathBuf,
    /// Directory holding cached `<sensor>.json` fixed metadata.
    pub sensor_metadata_cache: Option<PathBuf>,
    /// Score independent files on the rayon pool.
    pub parallel: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            working_folder: PathBuf::from("."),
            sensor_metadata_cache: None,
            parallel: false,
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
