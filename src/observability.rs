//! Tracing initialization
//!
//! Library code logs through `tracing` macros; the binary installs a stderr
//! subscriber here. `NOWPY_LOG` (an `EnvFilter` directive) overrides the
//! level chosen from `--verbose` / `--quiet`.

use tracing_subscriber::{prelude::*, EnvFilter};

/// Environment variable holding a filter directive, e.g. `nowpy=trace`
pub const LOG_ENV: &str = "NOWPY_LOG";

/// Default filter directive for the given verbosity flags
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "nowpy=debug,warn"
    } else {
        "warn"
    }
}

/// Initialize tracing. Call once at process startup.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .without_time(),
        )
        .try_init();
}
