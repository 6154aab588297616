//! Error types for sandboxed command execution.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors from preparing or running the sandboxed command.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The hosts table could not be read.
    #[error("Failed to read hosts table '{path}': {source}")]
    HostsTable {
        /// The hosts table path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The hosts override file could not be written.
    #[error("Failed to write hosts override file: {0}")]
    OverrideFile(#[source] std::io::Error),

    /// The setup marker file could not be created.
    #[error("Failed to create setup marker file: {0}")]
    Marker(#[source] std::io::Error),

    /// A setup step inside the namespace failed, so the command never ran.
    #[error("Failed to set up the hosts override in the namespace ({status})")]
    Setup {
        /// Exit status of the sandbox shell.
        status: ExitStatus,
    },

    /// The sandbox process could not be started.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// The program that was attempted.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the sandbox process failed.
    #[error("Failed to wait for sandboxed command: {0}")]
    Wait(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts_table_error_display() {
        let err = ExecutionError::HostsTable {
            path: PathBuf::from("/etc/hosts"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/hosts"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_spawn_error_display() {
        let err = ExecutionError::Spawn {
            program: "unshare".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("Failed to run 'unshare'"));
    }
}
