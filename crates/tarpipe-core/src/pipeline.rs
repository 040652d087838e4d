//! Streaming extraction pipeline.
//!
//! The archive is never decoded in-process. Its bytes are read in fixed-size
//! chunks and written into a pipe whose read end is the extractor's standard
//! input. The pipe's kernel buffer is the only flow control: a slow extractor
//! blocks the writer.

use std::fs;
use std::fs::DirBuilder;
use std::fs::File;
use std::io;
use std::io::PipeReader;
use std::io::PipeWriter;
use std::io::Read;
use std::io::Write;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;
use std::process::Child;
use std::process::Stdio;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ExtractConfig;
use crate::ExtractionCommand;
use crate::ExtractionReport;
use crate::Result;
use crate::TransferProgress;
use crate::TransferState;
use crate::UnpackError;
use crate::detect::detect_format;

/// Streams `archive` into the matching extractor, writing files below
/// `destination`.
///
/// The steps run strictly in order and each failure stops the call:
///
/// 1. size check (`EmptySource`, `SourceUnavailable`)
/// 2. content detection and command selection (`DetectionFailed`,
///    `UnsupportedFormat`); nothing on disk has changed yet
/// 3. destination creation (`DirectoryCreateFailed`)
/// 4. announcement through `progress.on_start`
/// 5. reopen of the source (`SourceUnreadable`)
/// 6. pipe creation (`PipeCreateFailed`)
/// 7. extractor spawn (`ExecFailed`) and the chunk loop (`SourceReadFailed`,
///    `TransferFailed`, `Cancelled`)
/// 8. wait for the extractor (`WaitFailed`)
///
/// After the loop the write end is closed, the extractor is awaited, and a
/// final frame at 1.0 is reported. A non-zero extractor exit is recorded as
/// a warning in the report rather than failing the call.
///
/// # Errors
///
/// Returns the `UnpackError` of the first step that failed. The source
/// file and both pipe ends are closed, and a spawned extractor is reaped,
/// before any error is returned.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use tarpipe_core::ExtractConfig;
/// use tarpipe_core::NoopProgress;
/// use tarpipe_core::extract;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractConfig::default();
/// let report = extract(
///     Path::new("rootfs.tar.xz"),
///     Path::new("/tmp/rootfs"),
///     &config,
///     &mut NoopProgress,
/// )?;
/// println!("forwarded {} bytes", report.bytes_forwarded);
/// # Ok(())
/// # }
/// ```
pub fn extract(
    archive: &Path,
    destination: &Path,
    config: &ExtractConfig,
    progress: &mut dyn TransferProgress,
) -> Result<ExtractionReport> {
    let started = Instant::now();

    let total_bytes = source_size(archive)?;
    if total_bytes == 0 {
        return Err(UnpackError::EmptySource {
            path: archive.to_path_buf(),
        });
    }

    let format = detect_format(archive, &config.detector)?;
    let command = ExtractionCommand::for_format(format, destination, &config.extractor)?;
    debug!(command = %command, "resolved extractor command");

    create_destination(destination, config.dir_mode)?;

    info!(
        archive = %archive.display(),
        destination = %destination.display(),
        format = %command.format(),
        total_bytes,
        "extracting archive"
    );
    progress.on_start(archive, total_bytes);

    let file = File::open(archive).map_err(|source| UnpackError::SourceUnreadable {
        path: archive.to_path_buf(),
        source,
    })?;

    let (pipe_reader, pipe_writer) = io::pipe().map_err(UnpackError::PipeCreateFailed)?;
    let mut child = spawn_extractor(&command, pipe_reader)?;

    let mut state = TransferState::new(total_bytes);
    if let Err(err) = forward(archive, file, pipe_writer, &mut state, config, progress) {
        reap(&mut child, matches!(err, UnpackError::Cancelled { .. }));
        return Err(err);
    }

    let exit_status = child.wait().map_err(|source| UnpackError::WaitFailed {
        bytes_forwarded: state.bytes_forwarded(),
        source,
    })?;

    progress.on_progress(1.0, state.bytes_forwarded());
    progress.on_finish();

    let mut report = ExtractionReport {
        archive: archive.to_path_buf(),
        destination: destination.to_path_buf(),
        format: command.format().clone(),
        total_bytes,
        bytes_forwarded: state.bytes_forwarded(),
        exit_status,
        duration: started.elapsed(),
        warnings: Vec::new(),
    };

    if !exit_status.success() {
        warn!(status = %exit_status, command = %command, "extractor exited unsuccessfully");
        report.add_warning(format!("extractor exited with {exit_status}"));
    }
    if state.bytes_forwarded() != total_bytes {
        report.add_warning(format!(
            "source changed size during extraction: expected {total_bytes} bytes, forwarded {}",
            state.bytes_forwarded()
        ));
    }

    Ok(report)
}

fn source_size(archive: &Path) -> Result<u64> {
    let unavailable = |source| UnpackError::SourceUnavailable {
        path: archive.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(archive).map_err(unavailable)?;
    if metadata.is_dir() {
        return Err(unavailable(io::Error::from(io::ErrorKind::IsADirectory)));
    }
    Ok(metadata.len())
}

fn create_destination(destination: &Path, mode: u32) -> Result<()> {
    DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(destination)
        .map_err(|source| UnpackError::DirectoryCreateFailed {
            path: destination.to_path_buf(),
            source,
        })
}

/// Spawns the extractor reading from `stdin`.
///
/// The parent's copy of the read end lives inside the `Command` and is
/// closed when it drops at the end of this function.
fn spawn_extractor(command: &ExtractionCommand, stdin: PipeReader) -> Result<Child> {
    let mut cmd = command.to_command();
    cmd.stdin(stdin).stdout(Stdio::null()).stderr(Stdio::null());

    let child = cmd.spawn().map_err(|source| UnpackError::ExecFailed {
        program: command.program().to_string_lossy().into_owned(),
        source,
    })?;
    debug!(pid = child.id(), "spawned extractor");
    Ok(child)
}

/// Copies `file` into `sink` chunk by chunk.
///
/// Takes ownership of both ends so they are closed on every return path,
/// which is what delivers end-of-input to the extractor.
fn forward(
    archive: &Path,
    mut file: File,
    mut sink: PipeWriter,
    state: &mut TransferState,
    config: &ExtractConfig,
    progress: &mut dyn TransferProgress,
) -> Result<()> {
    let mut buf = vec![0_u8; config.chunk_size.max(1)];

    loop {
        if config.is_cancelled() {
            return Err(UnpackError::Cancelled {
                bytes_forwarded: state.bytes_forwarded(),
            });
        }

        let read = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(UnpackError::SourceReadFailed {
                    path: archive.to_path_buf(),
                    bytes_forwarded: state.bytes_forwarded(),
                    source: e,
                });
            }
        };

        let before = state.bytes_forwarded();
        state.advance(read);
        progress.on_progress(state.fraction(), state.bytes_forwarded());

        sink.write_all(&buf[..read])
            .map_err(|source| UnpackError::TransferFailed {
                bytes_forwarded: before,
                source,
            })?;
    }

    drop(sink);
    drop(file);
    Ok(())
}

/// Waits for an extractor whose input was cut short, killing it first when
/// the transfer was cancelled.
fn reap(child: &mut Child, kill: bool) {
    if kill && let Err(e) = child.kill() {
        debug!(error = %e, "failed to kill extractor");
    }
    match child.wait() {
        Ok(status) => debug!(%status, "reaped extractor"),
        Err(e) => warn!(error = %e, "failed to reap extractor"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::CancellationToken;
    use crate::Tool;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        started: Option<(PathBuf, u64)>,
        fractions: Vec<f64>,
        finished: bool,
    }

    impl TransferProgress for Recorder {
        fn on_start(&mut self, archive: &Path, total_bytes: u64) {
            self.started = Some((archive.to_path_buf(), total_bytes));
        }

        fn on_progress(&mut self, fraction: f64, _bytes_forwarded: u64) {
            self.fractions.push(fraction);
        }

        fn on_finish(&mut self) {
            self.finished = true;
        }
    }

    fn labeler(label: &str) -> Tool {
        Tool::new("sh").with_args(["-c", &format!("echo {label}"), "sh"])
    }

    /// Extractor stand-in that stores its stdin as `<dest>/stream.bin`.
    fn capture() -> Tool {
        Tool::new("sh").with_args(["-c", "cat > \"$4/stream.bin\"", "sh"])
    }

    fn config(detector: Tool, extractor: Tool) -> ExtractConfig {
        ExtractConfig::default()
            .with_detector(detector)
            .with_extractor(extractor)
    }

    fn sample_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn test_stream_is_byte_exact() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("data.tar.gz");
        let data = sample_bytes(10_000);
        fs::write(&archive, &data).unwrap();
        let dest = temp.path().join("out");

        let mut progress = Recorder::default();
        let report = extract(
            &archive,
            &dest,
            &config(labeler("application/gzip"), capture()),
            &mut progress,
        )
        .unwrap();

        assert_eq!(fs::read(dest.join("stream.bin")).unwrap(), data);
        assert_eq!(report.bytes_forwarded, 10_000);
        assert_eq!(report.total_bytes, 10_000);
        assert_eq!(report.format, crate::ArchiveFormat::Gzip);
        assert!(report.extractor_succeeded());
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_progress_sequence() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("data.tar");
        fs::write(&archive, sample_bytes(5000)).unwrap();

        let mut progress = Recorder::default();
        extract(
            &archive,
            &temp.path().join("out"),
            &config(labeler("application/x-tar"), capture()),
            &mut progress,
        )
        .unwrap();

        assert_eq!(progress.started, Some((archive.clone(), 5000)));
        // 5 chunks of at most 1024 bytes, then the final frame.
        assert_eq!(progress.fractions.len(), 6);
        assert!(progress.fractions.windows(2).all(|w| w[0] <= w[1]));
        assert!((progress.fractions[4] - 1.0).abs() < f64::EPSILON);
        assert_eq!(progress.fractions.last().copied(), Some(1.0));
        assert!(progress.finished);
    }

    #[test]
    fn test_custom_chunk_size() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("data.tar");
        let data = sample_bytes(4096);
        fs::write(&archive, &data).unwrap();
        let dest = temp.path().join("out");

        let mut progress = Recorder::default();
        let cfg = config(labeler("application/x-tar"), capture()).with_chunk_size(4096);
        extract(&archive, &dest, &cfg, &mut progress).unwrap();

        assert_eq!(progress.fractions, vec![1.0, 1.0]);
        assert_eq!(fs::read(dest.join("stream.bin")).unwrap(), data);
    }

    #[test]
    fn test_empty_source_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("empty.tar.gz");
        fs::write(&archive, b"").unwrap();
        let marker = temp.path().join("detector-ran");
        let detector = Tool::new("sh").with_args([
            "-c",
            &format!("touch '{}'; echo application/gzip", marker.display()),
            "sh",
        ]);
        let dest = temp.path().join("out");

        let mut progress = Recorder::default();
        let err = extract(&archive, &dest, &config(detector, capture()), &mut progress)
            .unwrap_err();

        assert!(matches!(err, UnpackError::EmptySource { .. }));
        assert!(!marker.exists());
        assert!(!dest.exists());
        assert!(progress.started.is_none());
    }

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = extract(
            &temp.path().join("missing.tar"),
            &temp.path().join("out"),
            &config(labeler("application/x-tar"), capture()),
            &mut Recorder::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UnpackError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_directory_as_source() {
        let temp = TempDir::new().unwrap();
        let err = extract(
            temp.path(),
            &temp.path().join("out"),
            &config(labeler("application/x-tar"), capture()),
            &mut Recorder::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UnpackError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_unsupported_format_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("notes.tar.gz");
        fs::write(&archive, "just text\n").unwrap();
        let dest = temp.path().join("out");

        let mut progress = Recorder::default();
        let err = extract(
            &archive,
            &dest,
            &config(labeler("text/plain"), capture()),
            &mut progress,
        )
        .unwrap_err();

        match err {
            UnpackError::UnsupportedFormat { mime_type } => assert_eq!(mime_type, "text/plain"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dest.exists());
        assert!(progress.started.is_none());
    }

    #[test]
    fn test_detection_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.tar");
        fs::write(&archive, b"x").unwrap();

        let err = extract(
            &archive,
            &temp.path().join("out"),
            &config(Tool::new("/nonexistent/file-tool"), capture()),
            &mut Recorder::default(),
        )
        .unwrap_err();
        assert!(matches!(err, UnpackError::DetectionFailed { .. }));
    }

    #[test]
    fn test_directory_create_failure_spawns_nothing() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.tar");
        fs::write(&archive, b"x").unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let mut progress = Recorder::default();
        let err = extract(
            &archive,
            &blocker.join("out"),
            &config(labeler("application/x-tar"), capture()),
            &mut progress,
        )
        .unwrap_err();

        assert!(matches!(err, UnpackError::DirectoryCreateFailed { .. }));
        assert!(progress.started.is_none());
    }

    #[test]
    fn test_existing_destination_is_reused() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.tar");
        fs::write(&archive, b"abc").unwrap();
        let dest = temp.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("keep.txt"), b"keep").unwrap();

        extract(
            &archive,
            &dest,
            &config(labeler("application/x-tar"), capture()),
            &mut Recorder::default(),
        )
        .unwrap();

        assert!(dest.join("keep.txt").exists());
        assert_eq!(fs::read(dest.join("stream.bin")).unwrap(), b"abc");
    }

    #[test]
    fn test_missing_extractor_is_exec_failure() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.tar.xz");
        fs::write(&archive, b"payload").unwrap();
        let dest = temp.path().join("out");

        let mut progress = Recorder::default();
        let err = extract(
            &archive,
            &dest,
            &config(
                labeler("application/x-xz"),
                Tool::new("/nonexistent/tarpipe-tar"),
            ),
            &mut progress,
        )
        .unwrap_err();

        match err {
            UnpackError::ExecFailed { program, .. } => {
                assert_eq!(program, "/nonexistent/tarpipe-tar");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(dest.is_dir());
        assert!(progress.started.is_some());
        assert!(progress.fractions.is_empty());
    }

    #[test]
    fn test_failing_extractor_is_tolerated() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.tar");
        fs::write(&archive, sample_bytes(3000)).unwrap();

        let extractor = Tool::new("sh").with_args(["-c", "cat > /dev/null; exit 3", "sh"]);
        let mut progress = Recorder::default();
        let report = extract(
            &archive,
            &temp.path().join("out"),
            &config(labeler("application/x-tar"), extractor),
            &mut progress,
        )
        .unwrap();

        assert!(!report.extractor_succeeded());
        assert_eq!(report.exit_status.code(), Some(3));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(progress.fractions.last().copied(), Some(1.0));
    }

    #[test]
    fn test_early_exit_is_transfer_failure() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("big.tar");
        fs::write(&archive, sample_bytes(1024 * 1024)).unwrap();

        let extractor = Tool::new("sh").with_args(["-c", "exit 0", "sh"]);
        let mut progress = Recorder::default();
        let err = extract(
            &archive,
            &temp.path().join("out"),
            &config(labeler("application/x-tar"), extractor),
            &mut progress,
        )
        .unwrap_err();

        match &err {
            UnpackError::TransferFailed {
                bytes_forwarded,
                source,
            } => {
                assert!(*bytes_forwarded < 1024 * 1024);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!progress.finished);
    }

    #[test]
    fn test_cancelled_before_first_chunk() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("a.tar");
        fs::write(&archive, sample_bytes(2048)).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let cfg = config(labeler("application/x-tar"), capture()).with_cancellation(token);

        let mut progress = Recorder::default();
        let err = extract(&archive, &temp.path().join("out"), &cfg, &mut progress).unwrap_err();

        assert!(matches!(err, UnpackError::Cancelled { bytes_forwarded: 0 }));
        assert!(progress.fractions.is_empty());
    }

    #[test]
    fn test_read_failure_mid_stream_counts_as_spawned() {
        let temp = TempDir::new().unwrap();
        // Reading a directory handle fails with EISDIR on the first read.
        let unreadable = File::open(temp.path()).unwrap();
        let (reader, writer) = io::pipe().unwrap();

        let mut state = TransferState::new(4096);
        let mut progress = Recorder::default();
        let err = forward(
            temp.path(),
            unreadable,
            writer,
            &mut state,
            &ExtractConfig::default(),
            &mut progress,
        )
        .unwrap_err();
        drop(reader);

        match &err {
            UnpackError::SourceReadFailed {
                bytes_forwarded,
                source,
                ..
            } => {
                assert_eq!(*bytes_forwarded, 0);
                assert_eq!(source.kind(), io::ErrorKind::IsADirectory);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.spawned_extractor());
        assert!(progress.fractions.is_empty());
    }
}
