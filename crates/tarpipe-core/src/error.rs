//! Error types for the extraction pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `UnpackError`.
pub type Result<T> = std::result::Result<T, UnpackError>;

/// Errors that can occur while streaming an archive into an extractor.
///
/// Each variant is raised by exactly one stage of the pipeline, so the
/// variant alone tells how far the call got before it stopped.
#[derive(Error, Debug)]
pub enum UnpackError {
    /// Source file reports zero length.
    #[error("source archive is empty: {path}")]
    EmptySource {
        /// Path of the empty archive.
        path: PathBuf,
    },

    /// Source file metadata could not be read.
    #[error("cannot stat source archive {path}: {source}")]
    SourceUnavailable {
        /// Path of the archive.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Source file vanished or became unreadable between the size check
    /// and the reopen for streaming.
    #[error("cannot open source archive {path}: {source}")]
    SourceUnreadable {
        /// Path of the archive.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Content-inspection tool could not run or produced no output.
    #[error("format detection with `{program}` failed: {reason}")]
    DetectionFailed {
        /// Program used for detection.
        program: String,
        /// Why detection failed.
        reason: String,
    },

    /// Detected content type is not one of the supported archive kinds.
    #[error("unsupported archive format: {mime_type}")]
    UnsupportedFormat {
        /// Label reported by the content-inspection tool.
        mime_type: String,
    },

    /// Destination directory tree could not be created.
    #[error("cannot create destination directory {path}: {source}")]
    DirectoryCreateFailed {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Inter-process pipe could not be allocated.
    #[error("cannot create pipe: {0}")]
    PipeCreateFailed(#[source] io::Error),

    /// Extractor binary could not be launched.
    #[error("cannot launch extractor `{program}`: {source}")]
    ExecFailed {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing to the extractor's input failed mid-stream.
    #[error("transfer to extractor failed after {bytes_forwarded} bytes: {source}")]
    TransferFailed {
        /// Bytes handed to the pipe before the failure.
        bytes_forwarded: u64,
        /// Underlying I/O error (usually a broken pipe).
        #[source]
        source: io::Error,
    },

    /// Reading the source failed after the extractor was started.
    #[error("reading source archive {path} failed after {bytes_forwarded} bytes: {source}")]
    SourceReadFailed {
        /// Path of the archive.
        path: PathBuf,
        /// Bytes handed to the pipe before the failure.
        bytes_forwarded: u64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The whole archive was forwarded but the extractor's exit status
    /// could not be collected.
    #[error("cannot await extractor after forwarding {bytes_forwarded} bytes: {source}")]
    WaitFailed {
        /// Bytes handed to the pipe, normally the whole archive.
        bytes_forwarded: u64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Transfer was stopped through a cancellation token.
    #[error("extraction cancelled after {bytes_forwarded} bytes")]
    Cancelled {
        /// Bytes handed to the pipe before cancellation.
        bytes_forwarded: u64,
    },
}

impl UnpackError {
    /// Returns `true` if the "Extracting" announcement was already shown
    /// before this error occurred.
    ///
    /// Callers must not read the presence of that line as a sign of success.
    ///
    /// # Examples
    ///
    /// ```
    /// use tarpipe_core::UnpackError;
    ///
    /// let err = UnpackError::UnsupportedFormat {
    ///     mime_type: "text/plain".to_string(),
    /// };
    /// assert!(!err.was_announced());
    ///
    /// let err = UnpackError::Cancelled { bytes_forwarded: 0 };
    /// assert!(err.was_announced());
    /// ```
    #[must_use]
    pub const fn was_announced(&self) -> bool {
        matches!(
            self,
            Self::SourceUnreadable { .. }
                | Self::PipeCreateFailed(_)
                | Self::ExecFailed { .. }
                | Self::SourceReadFailed { .. }
                | Self::TransferFailed { .. }
                | Self::WaitFailed { .. }
                | Self::Cancelled { .. }
        )
    }

    /// Returns `true` if an extractor process was running when the error
    /// occurred.
    #[must_use]
    pub const fn spawned_extractor(&self) -> bool {
        matches!(
            self,
            Self::SourceReadFailed { .. }
                | Self::TransferFailed { .. }
                | Self::WaitFailed { .. }
                | Self::Cancelled { .. }
        )
    }

    /// Returns the number of bytes forwarded before the failure, if any
    /// bytes could have been forwarded.
    #[must_use]
    pub const fn bytes_forwarded(&self) -> Option<u64> {
        match self {
            Self::SourceReadFailed {
                bytes_forwarded, ..
            }
            | Self::TransferFailed {
                bytes_forwarded, ..
            }
            | Self::WaitFailed {
                bytes_forwarded, ..
            }
            | Self::Cancelled { bytes_forwarded } => Some(*bytes_forwarded),
            _ => None,
        }
    }
}
