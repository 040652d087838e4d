//! Streams archives into external extractors with live progress.
//!
//! `tarpipe-core` never decodes an archive itself. It classifies the file by
//! content with an external inspection tool (`file`), spawns the matching
//! extractor (`tar`), and forwards the archive bytes into the extractor's
//! standard input through a pipe, reporting progress after every chunk.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use tarpipe_core::ExtractConfig;
//! use tarpipe_core::extract;
//! use tarpipe_core::progress::BarRenderer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractConfig::default();
//! let mut bar = BarRenderer::stdout();
//! let report = extract(
//!     Path::new("rootfs.tar.xz"),
//!     Path::new("/srv/rootfs"),
//!     &config,
//!     &mut bar,
//! )?;
//! println!("Extracted {} ({} bytes)", report.format, report.bytes_forwarded);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(unix))]
compile_error!("tarpipe-core relies on Unix pipes and directory modes");

pub mod api;
pub mod command;
pub mod config;
pub mod detect;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod transfer;

// Re-export main API types
pub use api::extract_archive;
pub use command::ExtractionCommand;
pub use command::select_command;
pub use config::CancellationToken;
pub use config::ExtractConfig;
pub use config::Tool;
pub use detect::ArchiveFormat;
pub use detect::detect_format;
pub use detect::detect_mime_type;
pub use error::Result;
pub use error::UnpackError;
pub use pipeline::extract;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::TransferProgress;
pub use transfer::TransferState;
