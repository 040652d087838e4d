//! Unpack command implementation.

use crate::cli::ProgressMode;
use crate::cli::UnpackArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::DetailedProgress;
use anyhow::Context;
use anyhow::Result;
use std::env;
use tarpipe_core::ExtractConfig;
use tarpipe_core::NoopProgress;
use tarpipe_core::TransferProgress;
use tarpipe_core::extract;
use tarpipe_core::progress::Announcer;
use tarpipe_core::progress::BarRenderer;
use tracing::debug;

pub fn execute(
    args: &UnpackArgs,
    formatter: &dyn OutputFormatter,
    suppress_progress: bool,
) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let chunk_size =
        usize::try_from(args.chunk_size).context("chunk size does not fit in memory")?;
    let config = ExtractConfig::default()
        .with_detector(args.tools.detector())
        .with_extractor(args.tools.extractor())
        .with_chunk_size(chunk_size);

    let mode = args
        .progress
        .effective(suppress_progress, DetailedProgress::should_show());
    debug!(?mode, chunk_size, "starting unpack");

    let mut progress: Box<dyn TransferProgress> = match mode {
        ProgressMode::Bar => Box::new(BarRenderer::stdout()),
        ProgressMode::Detailed => Box::new(DetailedProgress::new()),
        ProgressMode::None if suppress_progress => Box::new(NoopProgress),
        ProgressMode::None => Box::new(Announcer::stdout()),
    };

    let report = add_archive_context(
        extract(&args.archive, &output_dir, &config, progress.as_mut()),
        &args.archive,
    )?;
    drop(progress);

    formatter.format_unpack_result(&report)?;

    Ok(())
}
