//! Extraction reporting and progress callbacks.

use std::path::Path;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use crate::ArchiveFormat;

/// Report of a completed extraction call.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Archive that was streamed.
    pub archive: PathBuf,

    /// Directory the extractor wrote into.
    pub destination: PathBuf,

    /// Detected archive format.
    pub format: ArchiveFormat,

    /// Size of the archive when the call started.
    pub total_bytes: u64,

    /// Bytes forwarded to the extractor.
    pub bytes_forwarded: u64,

    /// Exit status of the extractor.
    pub exit_status: ExitStatus,

    /// Duration of the whole call.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns whether the extractor exited successfully.
    ///
    /// A failing extractor does not fail the call; its status is kept here
    /// for callers that want to be stricter.
    #[must_use]
    pub fn extractor_succeeded(&self) -> bool {
        self.exit_status.success()
    }

    /// Average forwarding throughput in bytes per second.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.bytes_forwarded as f64 / secs
        } else {
            0.0
        }
    }
}

/// Callback trait for progress reporting during a transfer.
///
/// The pipeline calls `on_start` once after the destination exists,
/// `on_progress` after every chunk read, once more with a fraction of
/// exactly 1.0 after the extractor exits, and finally `on_finish`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tarpipe_core::TransferProgress;
///
/// struct Percent;
///
/// impl TransferProgress for Percent {
///     fn on_start(&mut self, archive: &Path, total_bytes: u64) {
///         println!("{}: {total_bytes} bytes", archive.display());
///     }
///
///     fn on_progress(&mut self, fraction: f64, _bytes_forwarded: u64) {
///         print!("\r{:.0}%", fraction * 100.0);
///     }
///
///     fn on_finish(&mut self) {
///         println!();
///     }
/// }
/// ```
pub trait TransferProgress: Send {
    /// Called once before the first byte is forwarded.
    fn on_start(&mut self, archive: &Path, total_bytes: u64);

    /// Called with the current fraction and byte count.
    fn on_progress(&mut self, fraction: f64, bytes_forwarded: u64);

    /// Called once after the final `on_progress`.
    fn on_finish(&mut self);
}

/// Progress callback that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl TransferProgress for NoopProgress {
    fn on_start(&mut self, _archive: &Path, _total_bytes: u64) {}

    fn on_progress(&mut self, _fraction: f64, _bytes_forwarded: u64) {}

    fn on_finish(&mut self) {}
}
