//! Local proxy sessions through `boundary connect`.
//!
//! [`ProxyLauncher`] starts `boundary connect` for a resolved host and target
//! and reads the session description the tool prints as its first line of
//! JSON output. The returned [`ProxySession`] owns the running process:
//!
//! - [`ProxySession::stop`] sends SIGTERM, waits a grace period, then SIGKILLs
//! - dropping a session that was never stopped sends SIGTERM once
//!
//! A launch that fails after the process started terminates it before
//! returning the error.

mod error;
mod info;
mod session;

pub use error::ProxyError;
pub use info::ConnectInfo;
pub use session::{ProxyLauncher, ProxySession};
