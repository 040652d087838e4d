//! Status-code entry point for callers that only need success or failure.

use std::path::Path;

use console::Term;
use tracing::error;

use crate::ExtractConfig;
use crate::UnpackError;
use crate::pipeline::extract;
use crate::progress::Announcer;
use crate::progress::BarRenderer;

/// Status returned by [`extract_archive`] on success.
pub const EXIT_SUCCESS: i32 = 0;

/// Status returned by [`extract_archive`] on any failure.
pub const EXIT_FAILURE: i32 = 1;

/// Reserved status for "the extractor could not be launched".
///
/// [`extract_archive`] keeps its 0/1 contract; front ends that want to
/// distinguish a missing extractor use this value via [`exit_code`].
pub const EXEC_FAILED_STATUS: i32 = 114;

/// Extracts an archive with default settings and reports a status code.
///
/// Draws the progress bar when standard output is a terminal; otherwise
/// only the `Extracting <archive> :` line is printed. Never
/// panics; failures are logged through `tracing` and reported as
/// [`EXIT_FAILURE`].
///
/// # Arguments
///
/// * `archive_path` - Path to the archive file
/// * `output_dir` - Directory where files will be extracted
///
/// # Examples
///
/// ```no_run
/// use tarpipe_core::extract_archive;
///
/// let status = extract_archive("rootfs.tar.gz", "/tmp/rootfs");
/// assert_eq!(status, 0);
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(archive_path: P, output_dir: Q) -> i32 {
    let archive = archive_path.as_ref();
    let output = output_dir.as_ref();
    let config = ExtractConfig::default();

    let result = if Term::stdout().is_term() {
        extract(archive, output, &config, &mut BarRenderer::stdout())
    } else {
        extract(archive, output, &config, &mut Announcer::stdout())
    };

    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(err) => {
            error!(archive = %archive.display(), error = %err, "extraction failed");
            EXIT_FAILURE
        }
    }
}

/// Maps an error to a process exit status.
///
/// # Examples
///
/// ```
/// use tarpipe_core::UnpackError;
/// use tarpipe_core::api::exit_code;
///
/// let err = UnpackError::Cancelled { bytes_forwarded: 0 };
/// assert_eq!(exit_code(&err), 1);
/// ```
#[must_use]
pub const fn exit_code(err: &UnpackError) -> i32 {
    match err {
        UnpackError::ExecFailed { .. } => EXEC_FAILED_STATUS,
        _ => EXIT_FAILURE,
    }
}
