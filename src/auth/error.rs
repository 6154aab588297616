//! Authentication error types.

use thiserror::Error;

/// Errors from obtaining or refreshing broker credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The broker reports no primary auth method for the scope.
    #[error("Unable to authenticate, no auth methods found")]
    NoPrimaryMethod,

    /// Listing auth methods failed.
    #[error("Failed to discover auth methods: {0}")]
    MethodDiscovery(String),

    /// The `boundary` CLI could not be started.
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        /// The command line that failed to start.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `boundary authenticate` exited non-zero.
    #[error("Unable to authenticate with {method_id}: {stderr}")]
    Failed {
        /// Auth method that was attempted.
        method_id: String,
        /// Diagnostic output of the authentication tool.
        stderr: String,
    },

    /// The token store is still empty after authenticating.
    #[error("No token available after authentication: {0}")]
    TokenUnavailable(String),
}
