//! Connection orchestration and lifecycle management.
//!
//! This module wires the components together for one invocation:
//! authenticate, resolve the host and target, start the proxy, run the
//! sandboxed command, and stop the proxy again on every path.

use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Instant;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::BrokerClient;
use crate::auth::CredentialManager;
use crate::cli::Cli;
use crate::config::Config;
use crate::directory::DirectoryResolver;
use crate::proxy::{ProxyLauncher, ProxySession};
use crate::sandbox::{unshare_available, unshare_version, SandboxExecutor};
use crate::telemetry::{self, AuditEvent};

/// No host with the requested name is reachable through a target with the
/// requested name.
#[derive(Debug, Error)]
#[error("Could not find host {hostname} or target {target}")]
pub struct NotFound {
    /// Requested hostname.
    pub hostname: String,
    /// Requested target name.
    pub target: String,
}

/// Run one invocation on a fresh current-thread runtime.
///
/// Returns the exit code to report: the command's own code, or `128 + N`
/// when it was killed by signal N.
pub fn run(cli: &Cli, config: &Config) -> Result<i32> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(connect_and_run(cli, config))
}

/// Authenticate, resolve, start the proxy and run the command.
pub async fn connect_and_run(cli: &Cli, config: &Config) -> Result<i32> {
    let unshare = Path::new(&config.sandbox.unshare_binary);
    if !unshare_available(unshare) {
        anyhow::bail!(
            "unshare ({}) is not installed or not in PATH. It is part of util-linux",
            unshare.display()
        );
    }
    debug!("unshare version: {:?}", unshare_version(unshare));

    let client =
        BrokerClient::new(&config.broker).context("Failed to create Boundary API client")?;
    let credentials = CredentialManager::new(client.clone(), &config.boundary.binary);

    let resolver = DirectoryResolver::connect(client, credentials)
        .await
        .context("Failed to obtain a Boundary token")?;

    let resolution = resolver
        .resolve(&cli.hostname, &cli.target)
        .await?
        .ok_or_else(|| NotFound {
            hostname: cli.hostname.clone(),
            target: cli.target.clone(),
        })?;
    info!(
        "Connecting to host {} via target {}",
        resolution.host_id, resolution.target_id
    );

    let launcher = ProxyLauncher::from_config(&config.boundary);
    let mut session = launcher
        .start(&resolution.host_id, &resolution.target_id, cli.listen_port)
        .await
        .context("Failed to start boundary connect")?;

    let executor = SandboxExecutor::from_settings(&config.sandbox);
    let status = run_with_session(&mut session, &executor, &cli.hostname, &cli.command_line())
        .await
        .context("Failed to run command")?;

    Ok(exit_code(status))
}

/// Run the command against a started session, then stop the session.
///
/// The session is stopped whether the command ran, failed, or could not be
/// started at all.
pub async fn run_with_session(
    session: &mut ProxySession,
    executor: &SandboxExecutor,
    hostname: &str,
    command_line: &str,
) -> Result<ExitStatus, crate::sandbox::ExecutionError> {
    let started = Instant::now();
    let result = executor.run(hostname, session.port(), command_line).await;

    if let Err(e) = session.stop().await {
        warn!("Failed to stop boundary connect: {}", e);
    }

    if let Ok(status) = &result {
        telemetry::record(AuditEvent::CommandExit {
            code: exit_code(*status),
            duration_sec: started.elapsed().as_secs(),
        });
    }
    result
}

/// Exit code for a finished command: its code, or `128 + N` for signal N.
pub fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}
