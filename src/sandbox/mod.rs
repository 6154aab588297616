//! Sandboxed command execution.
//!
//! The user command runs under `unshare --mount --map-root-user` with a shell
//! preamble that:
//!
//! 1. bind-mounts a hosts override file over the hosts table, so the target
//!    hostname resolves to the loopback address where the proxy listens
//! 2. exports the proxy port (`BOUNDARY_LISTEN_PORT` by default)
//! 3. removes a marker file, which tells the parent that setup succeeded
//! 4. runs the user command line verbatim
//!
//! Steps 1 to 3 run under `set -e`. If the bind mount fails the command is
//! never run against the real hosts table; the run fails with
//! `ExecutionError::Setup` instead.
//!
//! Only the mount namespace is private. The network namespace is shared with
//! the host, since the proxy listens on the host's loopback interface.
//!
//! The override file is a temp file that outlives the child and is removed
//! afterwards.

pub mod builder;
pub mod error;
pub mod executor;
pub mod hosts;

// Re-export main types for convenience
pub use builder::{shell_quote, Preamble, UnshareBuilder};
pub use error::ExecutionError;
pub use executor::{unshare_available, unshare_version, SandboxExecutor};
pub use hosts::{build_override, names_host, HostsOverride};
