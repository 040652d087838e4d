//! Extractor command selection.

use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use crate::ArchiveFormat;
use crate::Result;
use crate::Tool;
use crate::UnpackError;

/// Fully resolved invocation of the external extractor.
///
/// The command always reads the archive stream from standard input (`-f -`)
/// and writes extracted files below the destination (`-C <dest>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCommand {
    format: ArchiveFormat,
    program: OsString,
    args: Vec<OsString>,
    destination: PathBuf,
}

impl ExtractionCommand {
    /// Builds the command for `format`, extracting into `destination`.
    ///
    /// The destination does not have to exist yet.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for `ArchiveFormat::Unsupported`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use tarpipe_core::ArchiveFormat;
    /// use tarpipe_core::ExtractionCommand;
    /// use tarpipe_core::Tool;
    ///
    /// let cmd = ExtractionCommand::for_format(
    ///     ArchiveFormat::Xz,
    ///     Path::new("/tmp/out"),
    ///     &Tool::new("tar"),
    /// )
    /// .unwrap();
    /// assert_eq!(cmd.to_string(), "tar -xJf - -C /tmp/out");
    /// ```
    pub fn for_format(format: ArchiveFormat, destination: &Path, extractor: &Tool) -> Result<Self> {
        let mode = match &format {
            ArchiveFormat::Gzip => "-xzf",
            ArchiveFormat::Xz => "-xJf",
            ArchiveFormat::Tar => "-xf",
            ArchiveFormat::Unsupported(label) => {
                return Err(UnpackError::UnsupportedFormat {
                    mime_type: label.clone(),
                });
            }
        };

        let mut args = extractor.leading_args().to_vec();
        args.extend([mode, "-", "-C"].map(OsString::from));
        args.push(destination.as_os_str().to_owned());

        Ok(Self {
            format,
            program: extractor.program().to_owned(),
            args,
            destination: destination.to_path_buf(),
        })
    }

    /// Format the command was built for.
    pub fn format(&self) -> &ArchiveFormat {
        &self.format
    }

    /// Program to execute.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments passed after the program name.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Directory the extractor writes into.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&OsStr> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .collect()
    }

    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ExtractionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<_> = self.argv().iter().map(|s| s.to_string_lossy()).collect();
        f.write_str(&parts.join(" "))
    }
}

/// Maps a detector label straight to an extractor command.
///
/// # Errors
///
/// Returns `UnsupportedFormat` if `label` is not one of the three known
/// archive MIME types.
pub fn select_command(label: &str, destination: &Path, extractor: &Tool) -> Result<ExtractionCommand> {
    ExtractionCommand::for_format(ArchiveFormat::from_mime_type(label), destination, extractor)
}
