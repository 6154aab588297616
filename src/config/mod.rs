//! Configuration system for boundary-proxy.
//!
//! Configuration is TOML, loaded from several sources and merged in order:
//!
//! 1. Embedded defaults
//! 2. System config: `/etc/boundary-proxy/config.toml`
//! 3. User config: `~/.config/boundary-proxy/config.toml`
//! 4. Additional config file (via `--config` flag)
//! 5. Environment: `BOUNDARY_ADDR`
//! 6. CLI flags (highest priority)
//!
//! Scalars are overridden by later sources when they are set (non-empty,
//! non-zero). Missing system and user files are skipped; a missing `--config`
//! file is an error.
//!
//! ```toml
//! [broker]
//! addr = "https://boundary.example.com:9200"
//! scope_id = "global"
//!
//! [boundary]
//! binary = "/usr/local/bin/boundary"
//!
//! [sandbox]
//! hosts_path = "/etc/hosts"
//! port_env = "BOUNDARY_LISTEN_PORT"
//! ```

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::{ConfigLoader, BROKER_ADDR_ENV};
pub use schema::{
    BoundaryConfig, BrokerConfig, Config, SandboxSettings, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_PORT_ENV, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SCOPE_ID, DEFAULT_STOP_GRACE_MS,
};
