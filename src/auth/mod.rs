//! Credential lifecycle for the broker API.
//!
//! Tokens live in the `boundary` CLI's own token store, never in this
//! process's memory beyond the request that uses them. [`CredentialManager`]
//! reads the store on every call and drives `boundary authenticate` when the
//! store is empty or the broker rejects the current token.

mod error;
mod manager;
mod token;

pub use error::AuthError;
pub use manager::CredentialManager;
pub use token::Token;
