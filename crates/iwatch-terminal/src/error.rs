//! Error types for iwatch-terminal.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end an iwatch session.
#[derive(Debug, Error)]
pub enum WatchError {
    /// IO error from terminal operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The watched command could not be started.
    #[error("cannot run \"{command}\": {source}")]
    Spawn {
        /// Display form of the command.
        command: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The child started without a readable stdout.
    #[error("no output pipe for \"{command}\"")]
    Pipe {
        /// Display form of the command.
        command: String,
    },

    /// A configuration file could not be read or parsed.
    #[error("config {}: {message}", path.display())]
    Config {
        /// Offending file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Terminal not available.
    #[error("Terminal not available")]
    TerminalNotAvailable,
}

impl WatchError {
    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Spawn { .. } | Self::Pipe { .. } => 2,
            Self::Io(_) | Self::Config { .. } | Self::TerminalNotAvailable => 1,
        }
    }

    /// Whether this is an interrupted system call that should be retried.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_watch_error_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: WatchError = io_err.into();
        assert!(matches!(err, WatchError::Io(_)));
        assert!(err.to_string().contains("IO error"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_spawn_error_exit_code() {
        let err = WatchError::Spawn {
            command: "nope --flag".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("nope --flag"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_pipe_error_exit_code() {
        let err = WatchError::Pipe {
            command: "ls".into(),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "no output pipe for \"ls\"");
    }

    #[test]
    fn test_config_error_display() {
        let err = WatchError::Config {
            path: PathBuf::from("/tmp/iwatch.yaml"),
            message: "bad interval".into(),
        };
        assert_eq!(err.to_string(), "config /tmp/iwatch.yaml: bad interval");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_terminal_not_available() {
        let err = WatchError::TerminalNotAvailable;
        assert_eq!(err.to_string(), "Terminal not available");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_is_interrupted() {
        let err: WatchError = io::Error::new(io::ErrorKind::Interrupted, "eintr").into();
        assert!(err.is_interrupted());
        assert!(!WatchError::TerminalNotAvailable.is_interrupted());
    }
}
