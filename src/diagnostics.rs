//! Diagnostic reporting.
//!
//! The original dsync formats a message to stderr, optionally appending
//! `" : <strerror>"`, and resets `errno`. Rust has no global error
//! indicator to reset — every fallible operation already returns a
//! typed `Result` — so this module just gives the rest of the crate one
//! place to turn a context message plus an optional underlying error
//! into a log line. Both helpers go through `tracing`, the ambient
//! logging path `main` wires up to stderr.

use std::fmt::Display;

/// Log a fatal-for-this-entry condition.
///
/// `cause`'s `Display` impl supplies the `" : <description>"` suffix
/// when present (an `io::Error`'s `Display` already reads like
/// `strerror`'s output).
pub fn error(context: impl Display, cause: Option<&dyn std::error::Error>) {
    match cause {
        Some(err) => tracing::error!("{context} : {err}"),
        None => tracing::error!("{context}"),
    }
}

/// Log a non-fatal, skip-and-continue condition.
pub fn warn(context: impl Display, cause: Option<&dyn std::error::Error>) {
    match cause {
        Some(err) => tracing::warn!("{context} : {err}"),
        None => tracing::warn!("{context}"),
    }
}

/// Install the process-wide subscriber: stderr, no ANSI, level from
/// `RUST_LOG` (default `info`). Stdout is reserved for `-h` output.
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}
