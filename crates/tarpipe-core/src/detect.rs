//! Content-based archive format detection.
//!
//! Detection never looks at the file name. An external content-inspection
//! tool (`file` by default) classifies the file and its MIME type is mapped
//! onto [`ArchiveFormat`].

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use tracing::debug;

use crate::Result;
use crate::Tool;
use crate::UnpackError;

/// MIME type reported for gzip streams.
pub const MIME_GZIP: &str = "application/gzip";
/// MIME type reported for xz streams.
pub const MIME_XZ: &str = "application/x-xz";
/// MIME type reported for uncompressed tar archives.
pub const MIME_TAR: &str = "application/x-tar";

/// Archive container kinds the pipeline knows how to hand to an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar archive.
    Gzip,
    /// XZ-compressed tar archive.
    Xz,
    /// Uncompressed tar archive.
    Tar,
    /// Anything else, carrying the label the detector reported.
    Unsupported(String),
}

impl ArchiveFormat {
    /// Maps a detector label onto a format.
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use tarpipe_core::ArchiveFormat;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::from_mime_type("application/gzip"),
    ///     ArchiveFormat::Gzip
    /// );
    /// assert!(!ArchiveFormat::from_mime_type("Application/Gzip").is_supported());
    /// ```
    pub fn from_mime_type(label: &str) -> Self {
        match label {
            MIME_GZIP => Self::Gzip,
            MIME_XZ => Self::Xz,
            MIME_TAR => Self::Tar,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The MIME type this format was detected from.
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Gzip => MIME_GZIP,
            Self::Xz => MIME_XZ,
            Self::Tar => MIME_TAR,
            Self::Unsupported(label) => label,
        }
    }

    /// Returns `true` for every variant except `Unsupported`.
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Short name used in reports.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gzip => "tar.gz",
            Self::Xz => "tar.xz",
            Self::Tar => "tar",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Asks the content-inspection tool for the MIME type of `path`.
///
/// The tool is invoked as `<tool> --brief --mime-type <path>` and must print
/// a single line. The trailing line terminator is stripped.
///
/// # Errors
///
/// Returns `DetectionFailed` if the tool cannot be spawned or prints
/// nothing.
pub fn detect_mime_type(path: &Path, detector: &Tool) -> Result<String> {
    let output = detector
        .command()
        .arg("--brief")
        .arg("--mime-type")
        .arg(path)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| UnpackError::DetectionFailed {
            program: detector.display_name(),
            reason: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let label = stdout
        .strip_suffix('\n')
        .map_or(stdout.as_ref(), |s| s.strip_suffix('\r').unwrap_or(s));

    if label.is_empty() {
        return Err(UnpackError::DetectionFailed {
            program: detector.display_name(),
            reason: format!("no output (exit status: {})", output.status),
        });
    }

    debug!(path = %path.display(), mime_type = label, "detected content type");
    Ok(label.to_string())
}

/// Detects the archive format of `path` from its content.
///
/// # Errors
///
/// Returns `DetectionFailed` if the content-inspection tool fails. An
/// unrecognized label is not an error here; it yields
/// `ArchiveFormat::Unsupported`.
pub fn detect_format(path: &Path, detector: &Tool) -> Result<ArchiveFormat> {
    detect_mime_type(path, detector).map(|label| ArchiveFormat::from_mime_type(&label))
}
