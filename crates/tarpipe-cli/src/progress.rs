//! Detailed progress bar for the `--progress detailed` mode.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use std::fmt::Write;
use std::path::Path;
use tarpipe_core::TransferProgress;
use tarpipe_core::progress::announce;
use tracing::debug;

/// indicatif-backed progress display implementing `TransferProgress`.
///
/// Shows forwarded bytes, throughput and ETA. The bar is created when the
/// transfer starts, so nothing is drawn for archives rejected before that.
/// Cleans up on drop.
pub struct DetailedProgress {
    bar: Option<ProgressBar>,
    bytes_forwarded: u64,
}

impl DetailedProgress {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bar: None,
            bytes_forwarded: 0,
        }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }

    fn style() -> ProgressStyle {
        // Template: "Extracting rootfs.tar.xz [████████░░░░] 15.2 MB/40.0 MB (5.1 MB/s, 12s)"
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total} ({bytes_per_sec}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("bytes", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{}", humanize_bytes(state.pos())).unwrap_or(());
            })
            .with_key("total", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{}", humanize_bytes(state.len().unwrap_or(0))).unwrap_or(());
            })
            .with_key("bytes_per_sec", |state: &ProgressState, w: &mut dyn Write| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let bytes_per_sec = state.per_sec() as u64;
                write!(w, "{}/s", humanize_bytes(bytes_per_sec)).unwrap_or(());
            })
            .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{}", humanize_duration(state.eta())).unwrap_or(());
            })
            .progress_chars("█▓░")
    }
}

impl Default for DetailedProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DetailedProgress {
    fn drop(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl TransferProgress for DetailedProgress {
    fn on_start(&mut self, archive: &Path, total_bytes: u64) {
        // The bar is cleared when it finishes; this line stays.
        if let Err(e) = announce(&mut Term::stdout(), archive, console::colors_enabled()) {
            debug!(error = %e, "failed to print announcement");
        }

        let bar = ProgressBar::new(total_bytes);
        bar.set_style(Self::style());
        let name = archive
            .file_name()
            .map_or_else(|| archive.display().to_string(), |n| n.to_string_lossy().into_owned());
        bar.set_message(format!("Extracting {name}"));
        self.bar = Some(bar);
    }

    fn on_progress(&mut self, _fraction: f64, bytes_forwarded: u64) {
        self.bytes_forwarded = bytes_forwarded;
        if let Some(bar) = &self.bar {
            bar.set_position(bytes_forwarded);
        }
    }

    fn on_finish(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Converts duration to human-readable format.
pub fn humanize_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
