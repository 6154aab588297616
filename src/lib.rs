//! boundary-proxy: run a command against a Boundary target through a local proxy.
//!
//! Given a hostname and a Boundary target name, this crate looks both up in
//! the Boundary controller, starts `boundary connect` for them, and runs the
//! user's command in a private mount namespace where the hostname resolves to
//! the local proxy.
//!
//! # Architecture
//!
//! - **Auth**: Token store access and re-authentication via the `boundary` CLI
//! - **Directory**: Memoized target/host-set/host resolution with one auth retry
//! - **Proxy**: `boundary connect` session lifecycle
//! - **Sandbox**: Hosts override and `unshare` mount namespace for the command
//! - **Config**: Hierarchical TOML configuration
//! - **Telemetry**: Structured syslog logging for audit trails

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod directory;
pub mod orchestrator;
pub mod proxy;
pub mod sandbox;
pub mod telemetry;

#[cfg(test)]
mod testutil;
