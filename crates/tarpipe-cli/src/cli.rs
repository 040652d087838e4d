//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use std::path::PathBuf;
use tarpipe_core::Tool;
use tarpipe_core::config::DEFAULT_CHUNK_SIZE;

#[derive(Parser)]
#[command(name = "tarpipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Unpack an archive into a directory through an external extractor
    #[command(visible_alias = "extract")]
    Unpack(UnpackArgs),
    /// Detect an archive's format from its content
    Detect(DetectArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Unpack(_) => "unpack",
            Self::Detect(_) => "detect",
            Self::Completion(_) => "completion",
        }
    }
}

/// How transfer progress is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgressMode {
    /// Single-line bar with percentage
    Bar,
    /// Bar with bytes, throughput and ETA
    Detailed,
    /// No progress output
    None,
}

impl ProgressMode {
    /// Resolves the requested mode against the output situation.
    ///
    /// Progress is only drawn on a terminal and never alongside quiet or
    /// JSON output.
    pub const fn effective(self, suppressed: bool, is_terminal: bool) -> Self {
        if suppressed || !is_terminal {
            Self::None
        } else {
            self
        }
    }
}

/// External programs the pipeline runs.
#[derive(clap::Args)]
pub struct ToolArgs {
    /// Content-inspection program (words after the first are passed as
    /// leading arguments)
    #[arg(
        long = "file-command",
        env = "TARPIPE_FILE",
        default_value = "file",
        value_name = "PROGRAM"
    )]
    pub file_command: String,

    /// Extractor program (words after the first are passed as leading
    /// arguments)
    #[arg(
        long = "tar-command",
        env = "TARPIPE_TAR",
        default_value = "tar",
        value_name = "PROGRAM"
    )]
    pub tar_command: String,
}

impl ToolArgs {
    pub fn detector(&self) -> Tool {
        parse_tool(&self.file_command)
    }

    pub fn extractor(&self) -> Tool {
        parse_tool(&self.tar_command)
    }
}

#[derive(clap::Args)]
pub struct UnpackArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Progress display
    #[arg(long, value_enum, default_value_t = ProgressMode::Bar)]
    pub progress: ProgressMode,

    /// Bytes forwarded per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE as u64, value_parser = parse_byte_size)]
    pub chunk_size: u64,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(clap::Args)]
pub struct DetectArgs {
    /// File to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Directory shown in the resolved extractor command
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Splits a command string on whitespace into program and leading args.
fn parse_tool(command: &str) -> Tool {
    let mut words = command.split_whitespace();
    let program = words.next().unwrap_or(command);
    Tool::new(program).with_args(words)
}

/// Parse byte size with optional suffix (K, M, G)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
        .and_then(|n| {
            if n == 0 {
                Err("byte size must be positive".to_string())
            } else {
                Ok(n)
            }
        })
}
