//! Directory resolution error types.

use thiserror::Error;

use crate::auth::AuthError;

/// Errors from directory lookups.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The broker answered with a non-success status other than 401/403.
    #[error("Error getting {operation} from boundary (status {status}): {body}")]
    Status {
        /// What was being fetched.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, used as diagnostic detail.
        body: String,
    },

    /// The broker still rejected the request after re-authenticating.
    #[error("Error getting {operation} from boundary: still unauthorized after re-authenticating (status {status})")]
    Unauthorized {
        /// What was being fetched.
        operation: &'static str,
        /// HTTP status code of the second rejection.
        status: u16,
    },

    /// The request could not be sent or the response not read.
    #[error("Error getting {operation} from boundary: {source}")]
    Transport {
        /// What was being fetched.
        operation: &'static str,
        /// The underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON.
    #[error("Invalid {operation} response from boundary: {source}")]
    Decode {
        /// What was being fetched.
        operation: &'static str,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// Re-authentication after a 401/403 failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}
