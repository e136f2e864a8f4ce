//! Diagnostic logging to stderr
//!
//! Stdout may carry verified content, so every log line goes to stderr.
//! `GPGET_LOG` (then `RUST_LOG`) overrides the level chosen by flags.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`
pub const LOG_ENV: &str = "GPGET_LOG";

/// Level selected by `-v` count and `-q`
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn filter(verbose: u8, quiet: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            let level = level_for(verbose, quiet);
            EnvFilter::new(format!("gpget={level},gpget_openpgp={level}"))
        })
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: u8, quiet: bool) {
    let _ = tracing_subscriber::registry()
        .with(filter(verbose, quiet))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
