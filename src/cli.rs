//! Command-line interface definitions for boundary-proxy.
//!
//! Uses clap's derive API for type-safe argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Run a command with a Boundary target's hostname routed through a local proxy.
///
/// boundary-proxy looks up the host and target in the Boundary controller,
/// starts `boundary connect` for them, and runs COMMAND in a private mount
/// namespace where HOSTNAME resolves to the local proxy. The proxy port is
/// exported as `BOUNDARY_LISTEN_PORT`.
#[derive(Parser, Debug)]
#[command(name = "boundary-proxy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the host, as registered in Boundary.
    #[arg(long, value_name = "HOST")]
    pub hostname: String,

    /// Name of the Boundary target to connect through.
    #[arg(long, value_name = "NAME")]
    pub target: String,

    /// Local port for `boundary connect` to listen on.
    ///
    /// An ephemeral port is chosen by Boundary when omitted.
    #[arg(long = "listen_port", visible_alias = "listen-port", value_name = "PORT")]
    pub listen_port: Option<u16>,

    /// Boundary controller address (overrides BOUNDARY_ADDR and config files).
    #[arg(long, value_name = "URL")]
    pub addr: Option<String>,

    /// Path to additional config file.
    ///
    /// This config file is merged on top of system and user configs.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity.
    ///
    /// Can be specified multiple times:
    /// -v    = info level
    /// -vv   = debug level
    /// -vvv  = trace level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Command to run. Its words are joined with spaces and run by the shell.
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// The user command as a single shell line.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}
