//! Error conversion utilities for CLI.
//!
//! Converts tarpipe-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance. The typed error stays
//! in the chain so the exit status can still be derived from it.

use anyhow::Result;
use std::path::Path;
use tarpipe_core::UnpackError;
use tarpipe_core::api::EXIT_FAILURE;
use tarpipe_core::api::exit_code;

/// Converts `UnpackError` to user-friendly anyhow error with context
pub fn convert_unpack_error(err: UnpackError, archive: &Path) -> anyhow::Error {
    let message = match &err {
        UnpackError::EmptySource { .. } => format!(
            "Archive '{}' is empty\n\
             HINT: The download may have been interrupted.",
            archive.display()
        ),
        UnpackError::SourceUnavailable { .. }
        | UnpackError::SourceUnreadable { .. }
        | UnpackError::SourceReadFailed { .. } => {
            format!("Cannot read archive '{}'", archive.display())
        }
        UnpackError::DetectionFailed { program, .. } => format!(
            "Could not detect the format of '{}'\n\
             HINT: Make sure `{program}` is installed or set --file-command / TARPIPE_FILE.",
            archive.display()
        ),
        UnpackError::UnsupportedFormat { mime_type } => format!(
            "Archive format not supported: {} ({mime_type})\n\
             HINT: Supported formats: tar, tar.gz, tar.xz",
            archive.display()
        ),
        UnpackError::DirectoryCreateFailed { path, .. } => format!(
            "Cannot create output directory '{}'\n\
             HINT: Check permissions on the parent directory.",
            path.display()
        ),
        UnpackError::ExecFailed { program, .. } => format!(
            "Extractor `{program}` could not be started\n\
             HINT: Make sure tar is installed or set --tar-command / TARPIPE_TAR."
        ),
        UnpackError::TransferFailed { .. } => format!(
            "Extractor stopped reading '{}' before the end\n\
             HINT: The archive may be corrupted, or the extractor rejected it.",
            archive.display()
        ),
        _ => format!("Error processing archive '{}'", archive.display()),
    };

    anyhow::Error::new(err).context(message)
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, UnpackError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_unpack_error(e, archive))
}

/// Process exit status for a failed command.
///
/// A missing extractor gets its own status; everything else is 1.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    let code = err
        .downcast_ref::<UnpackError>()
        .map_or(EXIT_FAILURE, exit_code);
    u8::try_from(code).unwrap_or(1)
}
