//! Diagnostic logging to stderr.
//!
//! `RUST_LOG` takes precedence over the verbosity flags.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
fn default_directives(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "tarpipe=debug,tarpipe_core=debug"
    } else if quiet {
        "tarpipe=error,tarpipe_core=error"
    } else {
        "tarpipe=warn,tarpipe_core=warn"
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
