//! boundary-proxy: run a command with a Boundary host routed through a local proxy.
//!
//! This is the main entry point for the boundary-proxy binary. It handles CLI
//! argument parsing, configuration loading, telemetry initialization, and runs
//! the connection pipeline.
//!
//! # I/O Architecture
//!
//! The wrapped command owns the terminal:
//!
//! - **Audit logging**: Goes to syslog (not stdout/stderr)
//! - **Debug logging**: stderr, at `warn` unless `-v` or `RUST_LOG` ask for more
//! - **Failures**: a single `Error connecting: ...` line on stderr, exit code 1
//!
//! Otherwise the process exits with the wrapped command's exit code.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use boundary_proxy::{
    cli::Cli,
    config::{ConfigLoader, BROKER_ADDR_ENV},
    orchestrator,
    telemetry::{self, AuditEvent},
};
use clap::Parser;
use tracing::{debug, warn};

fn main() -> ExitCode {
    // Parse CLI arguments first (before any other initialization)
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!("Error connecting: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    init_tracing(cli.verbose)?;
    debug!("Parsed CLI arguments: {:?}", cli);

    // Syslog is best effort; fall back to discarding audit events
    if let Err(e) = telemetry::init_logger() {
        warn!("Audit logging disabled: {}", e);
        telemetry::init_null_logger();
    }

    let config = ConfigLoader::new()
        .load(cli, std::env::var(BROKER_ADDR_ENV).ok())
        .context("Failed to load configuration")?;
    debug!("Loaded configuration: {:?}", config);

    let started = Instant::now();
    telemetry::record(AuditEvent::SessionStart {
        user: whoami(),
        hostname: cli.hostname.clone(),
        target: cli.target.clone(),
        pid: std::process::id(),
    });

    let result = orchestrator::run(cli, &config);

    telemetry::record(AuditEvent::SessionEnd {
        user: whoami(),
        hostname: cli.hostname.clone(),
        duration_sec: started.elapsed().as_secs(),
    });

    result
}

/// Initialize the tracing subscriber for debug/development logging.
///
/// This is separate from the audit telemetry which goes to syslog.
///
/// # Verbosity Levels
/// - 0 (default): `RUST_LOG`, or only warnings and errors
/// - 1 (-v): Info level
/// - 2 (-vv): Debug level
/// - 3+ (-vvv): Trace level
fn init_tracing(verbose: u8) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

/// Get the current username for audit logging.
fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
