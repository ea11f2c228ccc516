//! Structured logging with tracing.
//!
//! Thread names are included so timer threads and capture threads can be
//! told apart from the supervisory loop in interleaved output.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Initializes logging from `RUST_LOG`, defaulting to `info`.
    pub fn init() {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_thread_names(true)
            .init()
    }

    /// Initializes logging from a counted `-v` CLI flag. An explicit
    /// `RUST_LOG` still wins.
    pub fn init_with_verbosity(verbosity: u8) {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity))),
            )
            .with_thread_names(true)
            .init()
    }
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}
