//! Detect command implementation.

use crate::cli::DetectArgs;
use crate::error::add_archive_context;
use crate::output::Detection;
use crate::output::OutputFormatter;
use anyhow::Result;
use tarpipe_core::ArchiveFormat;
use tarpipe_core::ExtractionCommand;
use tarpipe_core::detect_mime_type;

/// Reports the content type of a file and the extractor command it maps to.
///
/// An unsupported type is a result here, not an error.
pub fn execute(args: &DetectArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let mime_type = add_archive_context(
        detect_mime_type(&args.file, &args.tools.detector()),
        &args.file,
    )?;
    let format = ArchiveFormat::from_mime_type(&mime_type);

    let command = ExtractionCommand::for_format(
        format.clone(),
        &args.output_dir,
        &args.tools.extractor(),
    )
    .ok()
    .map(|cmd| cmd.to_string());

    formatter.format_detection(&Detection {
        file: args.file.clone(),
        mime_type,
        format,
        command,
    })
}
