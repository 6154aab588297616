//! `boundary connect` process lifecycle.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::ProxyError;
use super::info::ConnectInfo;
use crate::config::BoundaryConfig;
use crate::telemetry::{self, AuditEvent};

/// Starts `boundary connect` sessions.
#[derive(Debug, Clone)]
pub struct ProxyLauncher {
    binary: PathBuf,
    connect_timeout: Duration,
    stop_grace: Duration,
}

impl ProxyLauncher {
    /// Create a launcher for `binary` with the default timeouts.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            connect_timeout: Duration::from_millis(crate::config::DEFAULT_CONNECT_TIMEOUT_MS),
            stop_grace: Duration::from_millis(crate::config::DEFAULT_STOP_GRACE_MS),
        }
    }

    /// Create a launcher from the `[boundary]` config section.
    pub fn from_config(config: &BoundaryConfig) -> Self {
        Self::new(&config.binary)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .stop_grace(Duration::from_millis(config.stop_grace_ms))
    }

    /// How long to wait for the session description.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Grace period between SIGTERM and SIGKILL on stop.
    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    /// Path of the `boundary` binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments passed to `boundary`.
    pub fn connect_args(host_id: &str, target_id: &str, listen_port: Option<u16>) -> Vec<String> {
        let mut args = vec![
            "connect".to_string(),
            format!("-target-id={}", target_id),
            format!("-host-id={}", host_id),
            "-format".to_string(),
            "json".to_string(),
        ];
        if let Some(port) = listen_port {
            args.push(format!("-listen-port={}", port));
        }
        args
    }

    /// Start a session and wait for its description.
    ///
    /// On any error after the process has started, the process is stopped
    /// before the error is returned.
    pub async fn start(
        &self,
        host_id: &str,
        target_id: &str,
        listen_port: Option<u16>,
    ) -> Result<ProxySession, ProxyError> {
        let args = Self::connect_args(host_id, target_id, listen_port);
        debug!("Starting {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ProxyError::Spawn {
                command: format!("{} {}", self.binary.display(), args.join(" ")),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            let mut session = ProxySession::new(child, self.stop_grace);
            session.stop().await?;
            return Err(ProxyError::NoSessionInfo);
        };
        let mut stdout = BufReader::new(stdout);

        match self.read_connect_info(&mut stdout).await {
            Ok(connect_info) => {
                info!(
                    "Proxy for host {} listening on port {}",
                    host_id, connect_info.port
                );
                telemetry::record(AuditEvent::ProxyStarted {
                    host_id: host_id.to_string(),
                    target_id: target_id.to_string(),
                    port: connect_info.port,
                    session_id: connect_info.session_id.clone(),
                });
                let mut session = ProxySession::new(child, self.stop_grace);
                session.info = Some(connect_info);
                session.drain = Some(tokio::spawn(drain(stdout)));
                Ok(session)
            }
            Err(e) => {
                warn!("boundary connect failed to start: {}", e);
                let mut session = ProxySession::new(child, self.stop_grace);
                if let Err(stop_err) = session.stop().await {
                    warn!("Failed to stop half-started proxy: {}", stop_err);
                }
                Err(e)
            }
        }
    }

    async fn read_connect_info(
        &self,
        stdout: &mut BufReader<ChildStdout>,
    ) -> Result<ConnectInfo, ProxyError> {
        let mut line = String::new();
        let read = tokio::time::timeout(self.connect_timeout, stdout.read_line(&mut line))
            .await
            .map_err(|_| ProxyError::Timeout(self.connect_timeout))??;

        if read == 0 {
            return Err(ProxyError::NoSessionInfo);
        }
        ConnectInfo::parse(&line)
    }
}

/// Discard everything the tool writes after its session description.
///
/// The tool prints one line per proxied connection; an unread pipe would
/// eventually block it.
async fn drain(mut stdout: BufReader<ChildStdout>) {
    match tokio::io::copy(&mut stdout, &mut tokio::io::sink()).await {
        Ok(bytes) => debug!("boundary connect output closed after {} more bytes", bytes),
        Err(e) => debug!("Stopped reading boundary connect output: {}", e),
    }
}

/// A running `boundary connect` process.
#[derive(Debug)]
pub struct ProxySession {
    child: Child,
    drain: Option<JoinHandle<()>>,
    info: Option<ConnectInfo>,
    stop_grace: Duration,
    stopped: bool,
}

impl ProxySession {
    fn new(child: Child, stop_grace: Duration) -> Self {
        Self {
            child,
            drain: None,
            info: None,
            stop_grace,
            stopped: false,
        }
    }

    /// Session description reported by the tool.
    pub fn info(&self) -> Option<&ConnectInfo> {
        self.info.as_ref()
    }

    /// Local proxy port.
    pub fn port(&self) -> u16 {
        self.info.as_ref().map_or(0, |i| i.port)
    }

    /// PID of the `boundary connect` process, while it is running.
    pub fn pid(&self) -> Option<u32> {
        if self.stopped { None } else { self.child.id() }
    }

    /// Whether `stop` has completed.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Terminate the process: SIGTERM, then SIGKILL after the grace period.
    ///
    /// Calling this again after it succeeded does nothing. A process that has
    /// already exited is not an error.
    pub async fn stop(&mut self) -> Result<Option<ExitStatus>, ProxyError> {
        if self.stopped {
            return Ok(None);
        }

        if let Some(status) = self.child.try_wait()? {
            debug!("Proxy process had already exited with {}", status);
            self.mark_stopped();
            return Ok(Some(status));
        }

        if let Some(pid) = self.child.id() {
            match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => return Err(ProxyError::Signal(e)),
            }
        }

        let status = match tokio::time::timeout(self.stop_grace, self.child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    "Proxy process ignored SIGTERM for {:?}, killing",
                    self.stop_grace
                );
                self.child.kill().await?;
                self.child.wait().await?
            }
        };

        debug!("Proxy process exited with {}", status);
        self.mark_stopped();
        Ok(Some(status))
    }

    fn mark_stopped(&mut self) {
        self.stopped = true;
        if let Some(info) = &self.info {
            telemetry::record(AuditEvent::ProxyStopped { port: info.port });
        }
    }
}

impl Drop for ProxySession {
    fn drop(&mut self) {
        if let Some(drain) = self.drain.take() {
            drain.abort();
        }
        if self.stopped {
            return;
        }
        if let Some(pid) = self.child.id() {
            debug!("Proxy session dropped without stop, sending SIGTERM to {}", pid);
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }
}
