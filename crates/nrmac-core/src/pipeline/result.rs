use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{NaiveDateTime, TimeDelta, Timelike, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::consts::{QUALITY_FILE_KEY, STATUS_NO_INPUT, STATUS_OK};
use crate::metadata::{TRANSFORMER_NAME, TRANSFORMER_VERSION};

use super::batch::ScoredFile;

fn as_string<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn as_elapsed<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_elapsed(value))
}

/// Current UTC time as an ISO-8601 timestamp without offset.
pub fn utc_timestamp() -> String {
    format_timestamp(&Utc::now().naive_utc())
}

/// ISO-8601 rendering of `time`; the microsecond fraction is omitted when
/// it is zero.
pub fn format_timestamp(time: &NaiveDateTime) -> String {
    if time.nanosecond() / 1_000 == 0 {
        time.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Format a duration as `H:MM:SS[.ffffff]`.
pub fn format_elapsed(elapsed: &TimeDelta) -> String {
    let total_secs = elapsed.num_seconds().max(0);
    let micros = elapsed.subsec_nanos().max(0) / 1_000;
    let (hours, rem) = (total_secs / 3600, total_secs % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    if micros == 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OutputData {
    #[serde(rename = "MAC score", serialize_with = "as_string")]
    pub mac_score: f64,
    pub utc_timestamp: String,
    pub source_file: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OutputMetadata {
    pub replace: bool,
    pub data: OutputData,
}

/// Descriptor of one produced file, as consumed by the pipeline.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OutputFile {
    pub path: String,
    pub key: String,
    pub metadata: OutputMetadata,
}

impl From<&ScoredFile> for OutputFile {
    fn from(scored: &ScoredFile) -> Self {
        Self {
            path: scored.output.display().to_string(),
            key: QUALITY_FILE_KEY.to_string(),
            metadata: OutputMetadata {
                replace: true,
                data: OutputData {
                    mac_score: scored.score,
                    utc_timestamp: scored.utc_timestamp.clone(),
                    source_file: scored.source.display().to_string(),
                },
            },
        }
    }
}

/// Bookkeeping for one run, reported under the transformer name.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProcessingSummary {
    pub version: String,
    pub utc_timestamp: String,
    #[serde(serialize_with = "as_elapsed")]
    pub processing_time: TimeDelta,
    #[serde(serialize_with = "as_string")]
    pub num_files_received: usize,
    #[serde(serialize_with = "as_string")]
    pub num_image_files: usize,
    #[serde(serialize_with = "as_string")]
    pub num_processed_files: usize,
}

impl ProcessingSummary {
    pub fn new(
        processing_time: TimeDelta,
        num_files_received: usize,
        num_image_files: usize,
        num_processed_files: usize,
    ) -> Self {
        Self {
            version: TRANSFORMER_VERSION.to_string(),
            utc_timestamp: utc_timestamp(),
            processing_time,
            num_files_received,
            num_image_files,
            num_processed_files,
        }
    }
}

/// Result record handed back to the orchestrating pipeline.
///
/// Serialises as `{code, files, <transformer>: summary}` on success and as
/// `{code, error}` when the run never started.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchResult {
    pub code: i32,
    pub error: Option<String>,
    pub files: Vec<OutputFile>,
    pub summary: BTreeMap<String, ProcessingSummary>,
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("code", &self.code)?;
        match &self.error {
            Some(error) => map.serialize_entry("error", error)?,
            None => map.serialize_entry("files", &self.files)?,
        }
        for (name, summary) in &self.summary {
            map.serialize_entry(name, summary)?;
        }
        map.end()
    }
}

impl BatchResult {
    pub fn success(files: Vec<OutputFile>, summary: ProcessingSummary) -> Self {
        Self {
            code: STATUS_OK,
            error: None,
            files,
            summary: BTreeMap::from([(TRANSFORMER_NAME.to_string(), summary)]),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            code: STATUS_NO_INPUT,
            error: Some(message.into()),
            files: Vec::new(),
            summary: BTreeMap::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == STATUS_OK
    }

    /// Summary of the run, absent for failed pre-flight checks.
    pub fn processing_summary(&self) -> Option<&ProcessingSummary> {
        self.summary.get(TRANSFORMER_NAME)
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
