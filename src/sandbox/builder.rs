//! Builders for the `unshare` command line and the shell preamble it runs.

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;

/// Builder for constructing `unshare` command lines.
pub struct UnshareBuilder {
    program: OsString,
    args: Vec<OsString>,
}

impl UnshareBuilder {
    /// Create a builder for the given `unshare` binary.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a raw argument to the command line.
    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Create a private mount namespace.
    pub fn mount(self) -> Self {
        self.arg("--mount")
    }

    /// Create a user namespace with the current user mapped to root.
    ///
    /// Lets an unprivileged caller bind-mount inside the new mount namespace.
    pub fn map_root_user(self) -> Self {
        self.arg("--map-root-user")
    }

    /// Set the command to execute inside the namespaces.
    ///
    /// This must be called last before `build()`.
    pub fn command(mut self, cmd: &Path, args: &[String]) -> Self {
        self.args.push("--".into());
        self.args.push(cmd.as_os_str().to_owned());
        for arg in args {
            self.args.push(arg.into());
        }
        self
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Build the final Command (but don't execute it).
    pub fn build(self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Get the command line as a string (for debugging/logging).
    pub fn to_command_line(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        for arg in &self.args {
            let s = arg.to_string_lossy();
            if s.contains(char::is_whitespace) || s.contains('"') || s.contains('\'') {
                parts.push(shell_quote(&s));
            } else {
                parts.push(s.into_owned());
            }
        }
        parts.join(" ")
    }
}

/// Shell script run inside the namespaces before the user command.
///
/// Setup statements run under `set -e`, so the first failing one ends the
/// script before any command line runs. Command lines run with `set +e` and
/// the script's status is the last command's status.
#[derive(Debug, Default, Clone)]
pub struct Preamble {
    setup: Vec<String>,
    body: Vec<String>,
}

impl Preamble {
    /// Start an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `src` over `dest`.
    pub fn bind_mount(mut self, src: &Path, dest: &Path) -> Self {
        self.setup.push(format!(
            "mount --bind {} {}",
            shell_quote(&src.to_string_lossy()),
            shell_quote(&dest.to_string_lossy())
        ));
        self
    }

    /// Export an environment variable to the rest of the script.
    pub fn export(mut self, name: &str, value: &str) -> Self {
        self.setup
            .push(format!("export {}={}", name, shell_quote(value)));
        self
    }

    /// Remove `marker` once every earlier setup statement has succeeded.
    pub fn mark_ready(mut self, marker: &Path) -> Self {
        self.setup
            .push(format!("rm -f {}", shell_quote(&marker.to_string_lossy())));
        self
    }

    /// Append a command line verbatim, after all setup statements.
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    /// The script, one statement per line.
    pub fn render(&self) -> String {
        if self.setup.is_empty() {
            return self.body.join("\n");
        }
        let mut lines = Vec::with_capacity(self.setup.len() + self.body.len() + 2);
        lines.push("set -e".to_string());
        lines.extend(self.setup.iter().cloned());
        lines.push("set +e".to_string());
        lines.extend(self.body.iter().cloned());
        lines.join("\n")
    }
}

/// Quote `s` for POSIX shells, leaving plain words untouched.
pub fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-:=@%+,".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}
