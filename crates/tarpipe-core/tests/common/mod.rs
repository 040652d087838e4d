//! Fixture archives and tool checks shared by the integration tests.
//!
//! # Panics
//!
//! Helpers panic on I/O errors; they are meant for tests only.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;
use tarpipe_core::ExtractConfig;
use tarpipe_core::Tool;
use tarpipe_core::TransferProgress;
use xz2::write::XzEncoder;

/// Entries of the round-trip sample archive.
pub const SAMPLE_ENTRIES: &[(&str, &[u8])] = &[
    ("a.txt", b"alpha contents\n"),
    ("b/c.txt", b"nested charlie contents\n"),
];

/// Creates an in-memory TAR archive from `(path, content)` pairs.
///
/// Files are created with mode 0o644.
#[must_use]
pub fn create_test_tar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut ar = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        ar.append_data(&mut header, path, *data).unwrap();
    }
    ar.into_inner().unwrap()
}

/// Gzip-compressed variant of [`create_test_tar`].
#[must_use]
pub fn create_test_tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&create_test_tar(entries)).unwrap();
    encoder.finish().unwrap()
}

/// XZ-compressed variant of [`create_test_tar`].
#[must_use]
pub fn create_test_tar_xz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut encoder = XzEncoder::new(Vec::new(), 6);
    encoder.write_all(&create_test_tar(entries)).unwrap();
    encoder.finish().unwrap()
}

/// Writes `bytes` to `dir/name` and returns the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Returns `true` if every tool is on `PATH`; prints a skip note otherwise.
pub fn tools_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which::which(tool).is_err())
        .collect();
    if missing.is_empty() {
        true
    } else {
        eprintln!("skipping: {missing:?} not installed");
        false
    }
}

/// Config whose detector always answers `label`.
pub fn fixed_label_config(label: &str, extractor: Tool) -> ExtractConfig {
    ExtractConfig::default()
        .with_detector(Tool::new("sh").with_args(["-c", &format!("echo {label}"), "sh"]))
        .with_extractor(extractor)
}

/// Progress callback that records every call.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub started: Option<(PathBuf, u64)>,
    pub updates: Vec<(f64, u64)>,
    pub finished: bool,
}

impl RecordingProgress {
    pub fn fractions(&self) -> Vec<f64> {
        self.updates.iter().map(|(f, _)| *f).collect()
    }
}

impl TransferProgress for RecordingProgress {
    fn on_start(&mut self, archive: &Path, total_bytes: u64) {
        self.started = Some((archive.to_path_buf(), total_bytes));
    }

    fn on_progress(&mut self, fraction: f64, bytes_forwarded: u64) {
        self.updates.push((fraction, bytes_forwarded));
    }

    fn on_finish(&mut self) {
        self.finished = true;
    }
}
