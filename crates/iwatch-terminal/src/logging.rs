//! Diagnostic logging.
//!
//! The terminal belongs to the UI, so events go to a file named by
//! `IWATCH_LOG_FILE` or nowhere at all.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `debug` or `iwatch_terminal=trace`.
pub const LOG_ENV: &str = "IWATCH_LOG";
/// File that receives log output.
pub const LOG_FILE_ENV: &str = "IWATCH_LOG_FILE";

/// Filter from `IWATCH_LOG`, defaulting to `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. A second call is a no-op.
///
/// # Errors
///
/// Fails when `IWATCH_LOG_FILE` is set but cannot be opened for append.
pub fn init() -> io::Result<()> {
    let filter = env_filter();
    match std::env::var_os(LOG_FILE_ENV) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}
