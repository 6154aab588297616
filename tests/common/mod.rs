//! Shared fixtures for integration tests: stand-ins for `boundary`, `unshare`
//! and `mount` written into a temp dir.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use boundary_proxy::config::Config;
use tempfile::TempDir;

const BOUNDARY: &str = r#"dir='@DIR@'
case "$1" in
  config)
    if [ -s "$dir/token" ]; then cat "$dir/token"; exit 0; fi
    exit 1
    ;;
  authenticate)
    echo "$*" >> "$dir/auth.log"
    if [ -f "$dir/next_token" ]; then cp "$dir/next_token" "$dir/token"; fi
    exit 0
    ;;
  connect)
    echo "$*" >> "$dir/connect.log"
    trap 'echo term >> "$dir/terms"; exit 0' TERM
    echo '{"address":"127.0.0.1","port":45678,"protocol":"tcp","session_id":"s_it"}'
    while :; do sleep 0.05; done
    ;;
esac
exit 2"#;

const UNSHARE: &str = r#"dir='@DIR@'
if [ "$1" = "--version" ]; then echo "unshare from util-linux 2.39.3"; exit 0; fi
echo "$*" > "$dir/unshare.args"
while [ $# -gt 0 ] && [ "$1" != "--" ]; do shift; done
shift
export PATH="$dir/bin:$PATH"
exec "$@""#;

const MOUNT: &str = r#"dir='@DIR@'
echo "$*" > "$dir/mount.args"
cp "$2" "$dir/hosts.copy""#;

/// Fake external tools sharing one scratch directory.
pub struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        let tools = Self { dir };
        tools.script("boundary", BOUNDARY);
        tools.script("unshare", UNSHARE);
        tools.script("bin/mount", MOUNT);
        fs::write(tools.path("hosts"), "127.0.0.1 localhost\n10.0.0.5 db1 db1.internal\n").unwrap();
        tools
    }

    fn script(&self, name: &str, body: &str) {
        let path = self.path(name);
        let body = body.replace("@DIR@", &self.dir.path().to_string_lossy());
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn set_token(&self, token: &str) {
        fs::write(self.path("token"), token).unwrap();
    }

    pub fn set_next_token(&self, token: &str) {
        fs::write(self.path("next_token"), token).unwrap();
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap_or_default()
    }

    pub fn lines(&self, name: &str) -> usize {
        self.read(name).lines().count()
    }

    /// Configuration pointing every external tool at the fakes.
    pub fn config(&self, broker_addr: &str) -> Config {
        let mut config = Config::embedded();
        config.broker.addr = broker_addr.to_string();
        config.boundary.binary = self.path("boundary").display().to_string();
        config.boundary.stop_grace_ms = 2_000;
        config.sandbox.unshare_binary = self.path("unshare").display().to_string();
        config.sandbox.hosts_path = self.path("hosts").display().to_string();
        config
    }
}
