//! Single-line terminal progress bar.
//!
//! The bar looks like `[>>>>>>=======]  42.17%` and is redrawn in place
//! with a leading carriage return. The cursor is hidden only while a frame
//! is being written; [`CursorGuard`] restores it even if the write fails.

use std::io;
use std::io::Write;
use std::path::Path;

use console::Style;
use console::Term;
use tracing::debug;

use crate::TransferProgress;

/// Columns assumed when the terminal width cannot be queried.
pub const DEFAULT_COLUMNS: u16 = 80;

/// Columns reserved for the brackets, the space and the percentage label.
pub const BAR_MARGIN: usize = 10;

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

const FILLED_GLYPH: &str = ">";
const EMPTY_GLYPH: &str = "=";

/// Formats one frame of the bar for a terminal `columns` wide.
///
/// `fraction` is clamped to `[0, 1]`; NaN renders as empty.
///
/// # Examples
///
/// ```
/// use tarpipe_core::progress::render_line;
///
/// assert_eq!(render_line(0.5, 20, false), "[>>>>>=====]  50.00%");
/// ```
#[must_use]
pub fn render_line(fraction: f64, columns: u16, colored: bool) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let width = usize::from(columns).saturating_sub(BAR_MARGIN);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((width as f64 * fraction).round() as usize).min(width);

    let filled_style = Style::new().green().force_styling(colored);
    let empty_style = Style::new().yellow().force_styling(colored);

    format!(
        "[{}{}] {:>6.2}%",
        filled_style.apply_to(FILLED_GLYPH.repeat(filled)),
        empty_style.apply_to(EMPTY_GLYPH.repeat(width - filled)),
        fraction * 100.0
    )
}

/// Hides the cursor on creation and shows it again on drop.
///
/// Writes go through the guard so a frame can only be drawn while the
/// cursor is hidden.
pub struct CursorGuard<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> CursorGuard<'a, W> {
    /// Hides the cursor on `out`.
    pub fn hide(out: &'a mut W) -> io::Result<Self> {
        out.write_all(HIDE_CURSOR.as_bytes())?;
        Ok(Self { out })
    }
}

impl<W: Write> Write for CursorGuard<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> Drop for CursorGuard<'_, W> {
    fn drop(&mut self) {
        let _ = self.out.write_all(SHOW_CURSOR.as_bytes());
        let _ = self.out.flush();
    }
}

/// Progress bar drawn directly on a terminal.
///
/// # Examples
///
/// ```no_run
/// use tarpipe_core::progress::BarRenderer;
///
/// let mut bar = BarRenderer::stdout();
/// bar.draw(0.25)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct BarRenderer<W: Write = Term> {
    out: W,
    columns: Option<u16>,
    colored: bool,
}

impl BarRenderer<Term> {
    /// Renderer for standard output, sized to the terminal on every draw.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: Term::stdout(),
            columns: None,
            colored: console::colors_enabled(),
        }
    }
}

impl<W: Write> BarRenderer<W> {
    /// Renderer writing to `out` with a fixed width.
    pub fn with_writer(out: W, columns: u16, colored: bool) -> Self {
        Self {
            out,
            columns: Some(columns),
            colored,
        }
    }

    /// Consumes the renderer and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn columns(&self) -> u16 {
        self.columns
            .or_else(|| Term::stdout().size_checked().map(|(_, cols)| cols))
            .unwrap_or(DEFAULT_COLUMNS)
    }

    /// Draws one frame for `fraction`, overwriting the current line.
    pub fn draw(&mut self, fraction: f64) -> io::Result<()> {
        let line = render_line(fraction, self.columns(), self.colored);
        let mut guard = CursorGuard::hide(&mut self.out)?;
        write!(guard, "\r{line}")?;
        guard.flush()
    }
}

impl<W: Write + Send> TransferProgress for BarRenderer<W> {
    fn on_start(&mut self, archive: &Path, _total_bytes: u64) {
        if let Err(e) = announce(&mut self.out, archive, self.colored) {
            debug!(error = %e, "failed to print announcement");
        }
    }

    fn on_progress(&mut self, fraction: f64, _bytes_forwarded: u64) {
        if let Err(e) = self.draw(fraction) {
            debug!(error = %e, "failed to draw progress bar");
        }
    }

    fn on_finish(&mut self) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

/// Writes the `Extracting <archive> :` line that precedes a transfer.
///
/// The line is printed once the destination exists and before the
/// extractor starts, so it also shows up for transfers that later fail.
pub fn announce<W: Write>(out: &mut W, archive: &Path, colored: bool) -> io::Result<()> {
    let label = Style::new().yellow().force_styling(colored);
    let name = Style::new().cyan().force_styling(colored);
    writeln!(
        out,
        "{} {} :",
        label.apply_to("Extracting"),
        name.apply_to(archive.display())
    )?;
    out.flush()
}

/// Progress sink that only prints the announcement.
///
/// Used where no bar can be drawn, such as when standard output is a pipe.
pub struct Announcer<W: Write = Term> {
    out: W,
    colored: bool,
}

impl Announcer<Term> {
    /// Announcer for standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: Term::stdout(),
            colored: console::colors_enabled(),
        }
    }
}

impl<W: Write> Announcer<W> {
    /// Announcer writing to `out`.
    pub const fn with_writer(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    /// Consumes the announcer and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TransferProgress for Announcer<W> {
    fn on_start(&mut self, archive: &Path, _total_bytes: u64) {
        if let Err(e) = announce(&mut self.out, archive, self.colored) {
            debug!(error = %e, "failed to print announcement");
        }
    }

    fn on_progress(&mut self, _fraction: f64, _bytes_forwarded: u64) {}

    fn on_finish(&mut self) {}
}
