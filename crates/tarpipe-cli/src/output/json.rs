//! JSON output formatter for machine-readable results.

use super::formatter::Detection;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use tarpipe_core::ExtractionReport;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct UnpackOutput {
    archive: String,
    destination: String,
    format: &'static str,
    mime_type: String,
    total_bytes: u64,
    bytes_forwarded: u64,
    exit_code: Option<i32>,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl From<&ExtractionReport> for UnpackOutput {
    fn from(report: &ExtractionReport) -> Self {
        Self {
            archive: report.archive.display().to_string(),
            destination: report.destination.display().to_string(),
            format: report.format.name(),
            mime_type: report.format.mime_type().to_string(),
            total_bytes: report.total_bytes,
            bytes_forwarded: report.bytes_forwarded,
            exit_code: report.exit_status.code(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionOutput {
    file: String,
    mime_type: String,
    format: &'static str,
    supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<String>,
}

impl From<&Detection> for DetectionOutput {
    fn from(detection: &Detection) -> Self {
        Self {
            file: detection.file.display().to_string(),
            mime_type: detection.mime_type.clone(),
            format: detection.format.name(),
            supported: detection.format.is_supported(),
            command: detection.command.clone(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_unpack_result(&self, report: &ExtractionReport) -> Result<()> {
        Self::output(&JsonOutput::success("unpack", UnpackOutput::from(report)))
    }

    fn format_detection(&self, detection: &Detection) -> Result<()> {
        Self::output(&JsonOutput::success(
            "detect",
            DetectionOutput::from(detection),
        ))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::path::PathBuf;
    use std::process::ExitStatus;
    use std::time::Duration;
    use tarpipe_core::ArchiveFormat;

    #[test]
    fn test_unpack_output_structure() {
        let report = ExtractionReport {
            archive: PathBuf::from("a.tar.gz"),
            destination: PathBuf::from("out"),
            format: ArchiveFormat::Gzip,
            total_bytes: 10,
            bytes_forwarded: 10,
            exit_status: ExitStatus::from_raw(0),
            duration: Duration::from_millis(5),
            warnings: vec![],
        };

        let value =
            serde_json::to_value(JsonOutput::success("unpack", UnpackOutput::from(&report)))
                .unwrap();
        assert_eq!(value["operation"], "unpack");
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["format"], "tar.gz");
        assert_eq!(value["data"]["mime_type"], "application/gzip");
        assert_eq!(value["data"]["bytes_forwarded"], 10);
        assert_eq!(value["data"]["exit_code"], 0);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_output_structure() {
        let value = serde_json::to_value(JsonOutput::error("detect", "boom")).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "boom");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_detection_output_omits_missing_command() {
        let detection = Detection {
            file: PathBuf::from("x"),
            mime_type: "text/plain".to_string(),
            format: ArchiveFormat::from_mime_type("text/plain"),
            command: None,
        };
        let value = serde_json::to_value(DetectionOutput::from(&detection)).unwrap();
        assert_eq!(value["supported"], false);
        assert!(value.get("command").is_none());
    }
}
