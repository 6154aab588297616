//! Error types for proxy session operations.

use std::time::Duration;

use thiserror::Error;

/// Errors from starting or stopping a `boundary connect` session.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The `boundary connect` process could not be started.
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The process closed its output without describing a session.
    #[error("boundary connect exited without reporting a session")]
    NoSessionInfo,

    /// The first output line was not a session description.
    #[error("Invalid session description from boundary connect: {line:?}: {source}")]
    Parse {
        /// The offending line.
        line: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// No session description arrived in time.
    #[error("boundary connect did not report a session within {0:?}")]
    Timeout(Duration),

    /// Reading from or waiting on the process failed.
    #[error("Proxy process I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signalling the process failed.
    #[error("Failed to signal proxy process: {0}")]
    Signal(#[source] nix::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_includes_line() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ProxyError::Parse {
            line: "not json".to_string(),
            source,
        };
        assert!(err.to_string().contains("\"not json\""));
    }

    #[test]
    fn test_timeout_display() {
        let err = ProxyError::Timeout(Duration::from_millis(1500));
        assert!(err.to_string().contains("1.5s"));
    }
}
