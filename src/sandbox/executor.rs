//! Running the user command with the hosts override in place.

use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, ExitStatus, Stdio};

use tracing::{debug, info};

use super::builder::{Preamble, UnshareBuilder};
use super::error::ExecutionError;
use super::hosts::HostsOverride;
use crate::config::SandboxSettings;

/// Prefix of setup marker file names in the temp directory.
pub const MARKER_PREFIX: &str = "boundary-proxy-ready-";

/// Runs a shell command in a private mount namespace where one hostname
/// resolves to the local proxy.
#[derive(Debug, Clone)]
pub struct SandboxExecutor {
    hosts_path: PathBuf,
    shell: PathBuf,
    unshare_binary: PathBuf,
    loopback: String,
    port_env: String,
}

impl SandboxExecutor {
    /// Create an executor from the `[sandbox]` config section.
    pub fn from_settings(settings: &SandboxSettings) -> Self {
        Self {
            hosts_path: PathBuf::from(&settings.hosts_path),
            shell: PathBuf::from(&settings.shell),
            unshare_binary: PathBuf::from(&settings.unshare_binary),
            loopback: settings.loopback.clone(),
            port_env: settings.port_env.clone(),
        }
    }

    /// Hosts table that gets overridden.
    pub fn hosts_path(&self) -> &Path {
        &self.hosts_path
    }

    /// Script run by the shell inside the namespaces.
    ///
    /// `marker` is removed only after the bind mount and export succeeded.
    pub fn preamble(
        &self,
        override_path: &Path,
        marker: &Path,
        port: u16,
        command_line: &str,
    ) -> String {
        Preamble::new()
            .bind_mount(override_path, &self.hosts_path)
            .export(&self.port_env, &port.to_string())
            .mark_ready(marker)
            .line(command_line)
            .render()
    }

    /// The full `unshare` invocation for a preamble.
    pub fn command(&self, preamble: &str) -> UnshareBuilder {
        UnshareBuilder::new(&self.unshare_binary)
            .mount()
            .map_root_user()
            .command(&self.shell, &["-c".to_string(), preamble.to_string()])
    }

    /// Run `command_line` with `hostname` pointed at the loopback address and
    /// the proxy port exported.
    ///
    /// Stdio is inherited. Returns the command's exit status; a non-zero
    /// status is not an error here. A failed bind mount or export ends the
    /// shell before the command runs and is `ExecutionError::Setup`.
    pub async fn run(
        &self,
        hostname: &str,
        port: u16,
        command_line: &str,
    ) -> Result<ExitStatus, ExecutionError> {
        // Lives until the child has exited
        let hosts_override = HostsOverride::create(&self.hosts_path, hostname, &self.loopback)?;

        let marker = tempfile::Builder::new()
            .prefix(MARKER_PREFIX)
            .tempfile()
            .map_err(ExecutionError::Marker)?;

        let preamble = self.preamble(hosts_override.path(), marker.path(), port, command_line);
        let builder = self.command(&preamble);
        debug!("Sandbox command: {}", builder.to_command_line());

        let mut child = builder
            .build()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                program: self.unshare_binary.display().to_string(),
                source,
            })?;

        info!("Running command with {} mapped to {}", hostname, self.loopback);
        let status = child.wait().await.map_err(ExecutionError::Wait)?;
        debug!("Sandboxed command exited with {}", status);

        drop(hosts_override);
        if marker.path().exists() {
            return Err(ExecutionError::Setup { status });
        }
        Ok(status)
    }
}

/// Check if `unshare` is available.
pub fn unshare_available(unshare_binary: &Path) -> bool {
    StdCommand::new(unshare_binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Get `unshare` version string.
pub fn unshare_version(unshare_binary: &Path) -> Option<String> {
    StdCommand::new(unshare_binary)
        .arg("--version")
        .output()
        .ok()
        .and_then(|o| {
            if o.status.success() {
                String::from_utf8(o.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
}
