use std::fs;
use std::path::Path;
use std::process::Command;

use boundary_proxy::config::Config;
use boundary_proxy::sandbox::{
    build_override, unshare_available, HostsOverride, Preamble, SandboxExecutor, UnshareBuilder,
};

/// Whether this machine lets an unprivileged user create a mount namespace.
fn user_namespaces_work() -> bool {
    if !unshare_available(Path::new("unshare")) {
        return false;
    }
    Command::new("unshare")
        .args(["--mount", "--map-root-user", "--", "true"])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[test]
fn test_unshare_builder_basic() {
    let script = Preamble::new()
        .bind_mount(Path::new("/tmp/hosts override"), Path::new("/etc/hosts"))
        .export("BOUNDARY_LISTEN_PORT", "45678")
        .line("ssh db1")
        .render();
    let builder = UnshareBuilder::new("unshare")
        .mount()
        .map_root_user()
        .command(Path::new("/bin/sh"), &["-c".to_string(), script]);

    let cmd_line = builder.to_command_line();
    assert!(cmd_line.starts_with("unshare --mount --map-root-user -- /bin/sh -c "));
    assert!(cmd_line.contains("'/tmp/hosts override'"));
    assert!(cmd_line.contains("ssh db1"));
}

#[test]
fn test_override_from_real_hosts_table() {
    let table = fs::read_to_string("/etc/hosts").unwrap_or_default();
    let out = build_override(&table, "boundary-proxy-test.invalid", "127.0.0.1");

    assert_eq!(out.lines().count(), table.lines().count() + 1);
    assert!(out.ends_with("127.0.0.1 boundary-proxy-test.invalid\n"));
}

#[test]
fn test_hosts_override_file_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = dir.path().join("hosts");
    fs::write(&hosts, "127.0.0.1 localhost\n10.1.2.3 cache1\n").unwrap();

    let hosts_override = HostsOverride::create(&hosts, "CACHE1", "127.0.0.1").unwrap();
    let path = hosts_override.path().to_path_buf();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "127.0.0.1 localhost\n127.0.0.1 CACHE1\n"
    );
    // The table itself is never modified
    assert_eq!(
        fs::read_to_string(&hosts).unwrap(),
        "127.0.0.1 localhost\n10.1.2.3 cache1\n"
    );

    drop(hosts_override);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_full_sandbox_flow() {
    // Needs util-linux unshare and unprivileged user namespaces
    if !user_namespaces_work() {
        return;
    }

    let executor = SandboxExecutor::from_settings(&Config::embedded().sandbox);
    let status = executor
        .run(
            "boundary-proxy-test.invalid",
            45678,
            "grep -q '^127.0.0.1 boundary-proxy-test.invalid$' /etc/hosts && [ \"$BOUNDARY_LISTEN_PORT\" = 45678 ]",
        )
        .await
        .unwrap();
    assert!(status.success());

    // Outside the namespace the hosts table is untouched
    let table = fs::read_to_string("/etc/hosts").unwrap_or_default();
    assert!(!table.contains("boundary-proxy-test.invalid"));
}
