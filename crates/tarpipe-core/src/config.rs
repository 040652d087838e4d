//! Configuration for the extraction pipeline.

use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Default number of bytes moved per iteration of the streaming loop.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default permission bits for created destination directories.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// An external program plus the arguments that always precede the
/// per-call arguments.
///
/// Leading arguments let a wrapper stand in for the program itself, for
/// example `busybox tar` or `sh -c '...' sh`.
///
/// # Examples
///
/// ```
/// use tarpipe_core::Tool;
///
/// let tool = Tool::new("busybox").with_arg("tar");
/// assert_eq!(tool.display_name(), "busybox tar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Tool {
    /// Creates a tool that runs `program` with no leading arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Appends a leading argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Appends several leading arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name or path.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Arguments inserted before the per-call arguments.
    pub fn leading_args(&self) -> &[OsString] {
        &self.leading_args
    }

    /// Human-readable rendition used in logs and error messages.
    pub fn display_name(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.leading_args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds a `Command` for this tool with the leading arguments applied.
    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Shared flag that asks a running extraction to stop between chunks.
///
/// Cloning yields another handle to the same flag.
///
/// # Examples
///
/// ```
/// use tarpipe_core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for one extraction call.
///
/// # Examples
///
/// ```
/// use tarpipe_core::ExtractConfig;
/// use tarpipe_core::Tool;
///
/// let config = ExtractConfig::default()
///     .with_extractor(Tool::new("/usr/local/bin/gtar"))
///     .with_chunk_size(64 * 1024);
/// assert_eq!(config.chunk_size, 64 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Content-inspection tool, invoked as `<tool> --brief --mime-type <path>`.
    pub detector: Tool,

    /// Extractor, invoked as `<tool> -x[z|J]f - -C <dest>`.
    pub extractor: Tool,

    /// Bytes read and forwarded per loop iteration.
    pub chunk_size: usize,

    /// Permission bits for created destination directories.
    pub dir_mode: u32,

    /// Optional cancellation flag checked before every chunk.
    pub cancel: Option<CancellationToken>,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `detector`: `file`
    /// - `extractor`: `tar`
    /// - `chunk_size`: 1024
    /// - `dir_mode`: 0o755
    /// - `cancel`: none
    fn default() -> Self {
        Self {
            detector: Tool::new("file"),
            extractor: Tool::new("tar"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            dir_mode: DEFAULT_DIR_MODE,
            cancel: None,
        }
    }
}

impl ExtractConfig {
    /// Replaces the content-inspection tool.
    #[must_use]
    pub fn with_detector(mut self, detector: Tool) -> Self {
        self.detector = detector;
        self
    }

    /// Replaces the extractor tool.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Tool) -> Self {
        self.extractor = extractor;
        self
    }

    /// Sets the chunk size; zero is raised to one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sets the permission bits for created directories.
    #[must_use]
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
