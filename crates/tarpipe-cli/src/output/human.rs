//! Human-readable output formatter with colors and styling.

use super::formatter::Detection;
use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use tarpipe_core::ExtractionReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_colors {
            format!("{} {text}", style("✓").green().bold())
        } else {
            text.to_string()
        }
    }

    fn unpack_lines(&self, report: &ExtractionReport) -> Vec<String> {
        let mut lines = vec![
            self.heading("Extraction complete"),
            format!("  Archive:     {}", report.archive.display()),
            format!("  Format:      {}", report.format),
            format!("  Destination: {}", report.destination.display()),
            format!("  Forwarded:   {}", humanize_bytes(report.bytes_forwarded)),
        ];

        if self.verbose {
            lines.push(format!("  Duration:    {:?}", report.duration));
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let per_sec = report.throughput() as u64;
            lines.push(format!("  Throughput:  {}/s", humanize_bytes(per_sec)));
            lines.push(format!("  Extractor:   {}", report.exit_status));
        }

        if report.has_warnings() {
            lines.push(String::new());
            if self.use_colors {
                lines.push(style("Warnings:").yellow().bold().to_string());
            } else {
                lines.push("Warnings:".to_string());
            }
            for warning in &report.warnings {
                lines.push(format!("  - {warning}"));
            }
        }

        lines
    }

    fn detection_lines(detection: &Detection) -> Vec<String> {
        let mut lines = vec![
            format!("{}: {}", detection.file.display(), detection.mime_type),
            format!("  Format:    {}", detection.format),
        ];
        match &detection.command {
            Some(command) => lines.push(format!("  Extractor: {command}")),
            None => lines.push("  Extractor: none (unsupported format)".to_string()),
        }
        lines
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_unpack_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for line in self.unpack_lines(report) {
            self.term.write_line(&line)?;
        }
        Ok(())
    }

    fn format_detection(&self, detection: &Detection) -> Result<()> {
        // Detection output is the command's result, so it is printed in quiet
        // mode too
        for line in Self::detection_lines(detection) {
            self.term.write_line(&line)?;
        }
        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("Error:").red().bold()));
        } else {
            let _ = term.write_line(&format!("Error: {error:?}"));
        }
    }
}
