//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tarpipe_core::ArchiveFormat;
use tarpipe_core::ExtractionReport;

/// Outcome of the `detect` command.
#[derive(Debug)]
pub struct Detection {
    pub file: PathBuf,
    pub mime_type: String,
    pub format: ArchiveFormat,
    /// Resolved extractor command line, if the format is supported.
    pub command: Option<String>,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format unpack result
    fn format_unpack_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format detection result
    fn format_detection(&self, detection: &Detection) -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
