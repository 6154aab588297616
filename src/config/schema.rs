//! Configuration schema definitions.
//!
//! Every field deserializes to an "unset" value (empty string, zero) when it is
//! absent from a file, so that merging a partial file never clobbers values
//! from an earlier source. The populated defaults live in [`Config::embedded`].

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Default scope for auth-method discovery and target listing.
pub const DEFAULT_SCOPE_ID: &str = "global";

/// Default timeout for broker API requests.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default time to wait for the tunneling tool's first output line.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;

/// Default grace period between SIGTERM and SIGKILL for the tunneling tool.
pub const DEFAULT_STOP_GRACE_MS: u64 = 5_000;

/// Environment variable carrying the proxy port into the sandboxed command.
pub const DEFAULT_PORT_ENV: &str = "BOUNDARY_LISTEN_PORT";

/// Top-level configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Broker (controller API) settings.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// External `boundary` CLI settings.
    #[serde(default)]
    pub boundary: BoundaryConfig,

    /// Sandboxed command settings.
    #[serde(default)]
    pub sandbox: SandboxSettings,
}

impl Config {
    /// The built-in defaults every load starts from.
    pub fn embedded() -> Self {
        Self {
            broker: BrokerConfig {
                addr: String::new(),
                scope_id: DEFAULT_SCOPE_ID.to_string(),
                request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            },
            boundary: BoundaryConfig {
                binary: "boundary".to_string(),
                connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
                stop_grace_ms: DEFAULT_STOP_GRACE_MS,
            },
            sandbox: SandboxSettings {
                hosts_path: "/etc/hosts".to_string(),
                shell: "/bin/sh".to_string(),
                unshare_binary: "unshare".to_string(),
                loopback: "127.0.0.1".to_string(),
                port_env: DEFAULT_PORT_ENV.to_string(),
            },
        }
    }

    /// Merge another config into this one.
    ///
    /// Scalars are overridden when the other side sets them.
    pub fn merge(&mut self, other: Config) {
        self.broker.merge(other.broker);
        self.boundary.merge(other.boundary);
        self.sandbox.merge(other.sandbox);
    }

    /// Check that the merged configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let addr = self.broker.addr.trim();
        if addr.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "broker.addr".to_string(),
                message: "no broker address configured (set BOUNDARY_ADDR)".to_string(),
            });
        }
        if !addr.starts_with("http://") && !addr.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "broker.addr".to_string(),
                message: format!("'{}' is not an http(s) URL", addr),
            });
        }
        if self.sandbox.port_env.is_empty() || self.sandbox.port_env.contains('=') {
            return Err(ConfigError::InvalidValue {
                field: "sandbox.port_env".to_string(),
                message: format!("'{}' is not a valid variable name", self.sandbox.port_env),
            });
        }
        Ok(())
    }
}

/// Broker API settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BrokerConfig {
    /// Controller base address, e.g. `https://boundary.example.com:9200`.
    #[serde(default)]
    pub addr: String,

    /// Scope for auth-method discovery and target listing.
    #[serde(default)]
    pub scope_id: String,

    /// Timeout for each API request in milliseconds.
    #[serde(default)]
    pub request_timeout_ms: u64,
}

impl BrokerConfig {
    fn merge(&mut self, other: BrokerConfig) {
        if !other.addr.is_empty() {
            self.addr = other.addr;
        }
        if !other.scope_id.is_empty() {
            self.scope_id = other.scope_id;
        }
        if other.request_timeout_ms != 0 {
            self.request_timeout_ms = other.request_timeout_ms;
        }
    }
}

/// Settings for the external `boundary` CLI.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BoundaryConfig {
    /// Path or name of the `boundary` binary.
    #[serde(default)]
    pub binary: String,

    /// How long to wait for `boundary connect` to report its session.
    #[serde(default)]
    pub connect_timeout_ms: u64,

    /// Grace period between SIGTERM and SIGKILL when stopping the proxy.
    #[serde(default)]
    pub stop_grace_ms: u64,
}

impl BoundaryConfig {
    fn merge(&mut self, other: BoundaryConfig) {
        if !other.binary.is_empty() {
            self.binary = other.binary;
        }
        if other.connect_timeout_ms != 0 {
            self.connect_timeout_ms = other.connect_timeout_ms;
        }
        if other.stop_grace_ms != 0 {
            self.stop_grace_ms = other.stop_grace_ms;
        }
    }
}

/// Settings for the sandboxed command.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SandboxSettings {
    /// Hosts table to copy and bind over.
    #[serde(default)]
    pub hosts_path: String,

    /// Shell that runs the preamble.
    #[serde(default)]
    pub shell: String,

    /// Path or name of the `unshare` binary.
    #[serde(default)]
    pub unshare_binary: String,

    /// Address the target hostname is pointed at.
    #[serde(default)]
    pub loopback: String,

    /// Name of the variable carrying the proxy port.
    #[serde(default)]
    pub port_env: String,
}

impl SandboxSettings {
    fn merge(&mut self, other: SandboxSettings) {
        if !other.hosts_path.is_empty() {
            self.hosts_path = other.hosts_path;
        }
        if !other.shell.is_empty() {
            self.shell = other.shell;
        }
        if !other.unshare_binary.is_empty() {
            self.unshare_binary = other.unshare_binary;
        }
        if !other.loopback.is_empty() {
            self.loopback = other.loopback;
        }
        if !other.port_env.is_empty() {
            self.port_env = other.port_env;
        }
    }
}
