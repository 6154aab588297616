//! Test helpers shared by unit tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use httpmock::MockServer;
use tempfile::TempDir;

use crate::api::BrokerClient;
use crate::config::Config;

/// Stand-in for the `boundary` CLI.
///
/// A shell script answering `config get-token`, `authenticate` and `connect`
/// from files in its own temp directory, and recording every call.
pub(crate) struct FakeBoundary {
    dir: TempDir,
    path: PathBuf,
}

const FAKE_BOUNDARY: &str = r#"#!/bin/sh
dir='@DIR@'
case "$1" in
  config)
    if [ -s "$dir/token" ]; then cat "$dir/token"; exit 0; fi
    echo "Error: no token found in store" >&2
    exit 1
    ;;
  authenticate)
    shift
    echo "$*" >> "$dir/auth.log"
    if [ -f "$dir/auth_fail" ]; then cat "$dir/auth_fail" >&2; exit 1; fi
    if [ -f "$dir/next_token" ]; then cp "$dir/next_token" "$dir/token"; fi
    exit 0
    ;;
  connect)
    shift
    echo "$*" >> "$dir/connect.log"
    if [ ! -f "$dir/connect_line" ]; then echo "Error: session authorization failed" >&2; exit 1; fi
    trap 'echo term >> "$dir/terms"; exit 0' TERM
    cat "$dir/connect_line"
    while :; do sleep 0.05; done
    ;;
esac
echo "unknown command: $1" >&2
exit 2
"#;

impl FakeBoundary {
    pub(crate) fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("boundary-proxy-fake-")
            .tempdir()
            .unwrap();
        let path = dir.path().join("boundary");
        let script = FAKE_BOUNDARY.replace("@DIR@", &dir.path().to_string_lossy());
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir, path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Token currently in the store.
    pub(crate) fn set_token(&self, token: &str) {
        fs::write(self.dir.path().join("token"), token).unwrap();
    }

    /// Token the store holds after a successful `authenticate`.
    pub(crate) fn set_next_token(&self, token: &str) {
        fs::write(self.dir.path().join("next_token"), token).unwrap();
    }

    /// Make `authenticate` fail with `stderr`.
    pub(crate) fn fail_auth(&self, stderr: &str) {
        fs::write(self.dir.path().join("auth_fail"), stderr).unwrap();
    }

    /// First line `connect` prints before idling.
    pub(crate) fn set_connect_line(&self, line: &str) {
        fs::write(self.dir.path().join("connect_line"), format!("{}\n", line)).unwrap();
    }

    pub(crate) fn auth_calls(&self) -> Vec<String> {
        self.read_lines("auth.log")
    }

    pub(crate) fn connect_calls(&self) -> Vec<String> {
        self.read_lines("connect.log")
    }

    /// Number of SIGTERMs the `connect` process handled.
    pub(crate) fn terminations(&self) -> usize {
        self.read_lines("terms").len()
    }

    fn read_lines(&self, name: &str) -> Vec<String> {
        fs::read_to_string(self.dir.path().join(name))
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }
}

/// Broker client pointed at a mock server.
pub(crate) fn broker_client(server: &MockServer) -> BrokerClient {
    let mut config = Config::embedded().broker;
    config.addr = server.base_url();
    BrokerClient::new(&config).unwrap()
}
