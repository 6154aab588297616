//! Hosts override file: the hosts table with one name pointed at loopback.
//!
//! A line is dropped only when one of its host fields equals the hostname,
//! ignoring ASCII case. Overriding `db1` keeps the lines for `db10` and
//! `db1.internal`, which a substring match would remove, and still catches
//! `DB1` since resolvers compare names case-insensitively.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::ExecutionError;

/// Prefix of override file names in the temp directory.
pub const OVERRIDE_PREFIX: &str = "boundary-proxy-hosts-";

/// Whether a hosts table line maps an address to `hostname`.
///
/// Compares each host field (after the address, before any `#` comment)
/// case-insensitively. Comment and blank lines never match.
pub fn names_host(line: &str, hostname: &str) -> bool {
    let entry = line.split('#').next().unwrap_or_default();
    entry
        .split_whitespace()
        .skip(1)
        .any(|name| name.eq_ignore_ascii_case(hostname))
}

/// Copy `table` without the lines naming `hostname`, then map `hostname` to
/// `loopback`.
///
/// Every other line, comments included, is kept byte for byte.
pub fn build_override(table: &str, hostname: &str, loopback: &str) -> String {
    let mut out = String::with_capacity(table.len() + hostname.len() + loopback.len() + 2);
    for line in table.split_inclusive('\n') {
        if names_host(line, hostname) {
            continue;
        }
        out.push_str(line);
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(loopback);
    out.push(' ');
    out.push_str(hostname);
    out.push('\n');
    out
}

/// A hosts override written to a temp file.
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct HostsOverride {
    file: NamedTempFile,
}

impl HostsOverride {
    /// Read `hosts_path` and write its override for `hostname`.
    ///
    /// The contents are flushed and synced before this returns.
    pub fn create(hosts_path: &Path, hostname: &str, loopback: &str) -> Result<Self, ExecutionError> {
        let table = fs::read_to_string(hosts_path).map_err(|source| ExecutionError::HostsTable {
            path: hosts_path.to_path_buf(),
            source,
        })?;
        let contents = build_override(&table, hostname, loopback);

        let mut file = tempfile::Builder::new()
            .prefix(OVERRIDE_PREFIX)
            .tempfile()
            .map_err(ExecutionError::OverrideFile)?;
        file.write_all(contents.as_bytes())
            .map_err(ExecutionError::OverrideFile)?;
        file.flush().map_err(ExecutionError::OverrideFile)?;
        file.as_file()
            .sync_all()
            .map_err(ExecutionError::OverrideFile)?;
        // Bound over the hosts table, so it must stay world-readable
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o644))
            .map_err(ExecutionError::OverrideFile)?;

        debug!(
            "Wrote hosts override for {} to {}",
            hostname,
            file.path().display()
        );
        Ok(Self { file })
    }

    /// Path of the override file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
127.0.0.1\tlocalhost
# The following lines are desirable for IPv6 capable hosts
::1     ip6-localhost ip6-loopback
10.0.0.5 db1.internal DB1 # primary
10.0.0.6 db10
";

    #[test]
    fn test_names_host_matches_whole_fields() {
        assert!(names_host("10.0.0.5 db1", "db1"));
        assert!(names_host("10.0.0.5 db1.internal db1", "db1"));
        assert!(names_host("10.0.0.5\tDB1\n", "db1"));
        assert!(!names_host("10.0.0.6 db10", "db1"));
        assert!(!names_host("10.0.0.5 db1.internal", "db1"));
    }

    #[test]
    fn test_names_host_ignores_address_and_comments() {
        assert!(!names_host("db1 other", "db1"));
        assert!(!names_host("# 10.0.0.5 db1", "db1"));
        assert!(!names_host("10.0.0.5 web # was db1", "db1"));
        assert!(!names_host("", "db1"));
    }

    #[test]
    fn test_override_drops_named_lines_and_appends_loopback() {
        let out = build_override(TABLE, "db1", "127.0.0.1");

        assert!(!out.contains("10.0.0.5"));
        assert!(out.contains("10.0.0.6 db10\n"));
        assert!(out.contains("# The following lines"));
        assert!(out.ends_with("127.0.0.1 db1\n"));
        // One line dropped, one appended
        assert_eq!(out.lines().count(), TABLE.lines().count());
    }

    #[test]
    fn test_override_line_count() {
        let table = "10.0.0.1 a\n10.0.0.2 b\n10.0.0.3 B alias\n10.0.0.4 c\n";
        let out = build_override(table, "b", "127.0.0.1");
        assert_eq!(out.lines().count(), (4 - 2) + 1);
        assert_eq!(out.lines().filter(|l| *l == "127.0.0.1 b").count(), 1);
    }

    #[test]
    fn test_override_without_trailing_newline() {
        let out = build_override("127.0.0.1 localhost", "db1", "127.0.0.1");
        assert_eq!(out, "127.0.0.1 localhost\n127.0.0.1 db1\n");
    }

    #[test]
    fn test_override_of_empty_table() {
        assert_eq!(build_override("", "db1", "127.0.0.2"), "127.0.0.2 db1\n");
    }

    #[test]
    fn test_create_writes_file_and_drop_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        fs::write(&hosts, TABLE).unwrap();

        let hosts_override = HostsOverride::create(&hosts, "db10", "127.0.0.1").unwrap();
        let path = hosts_override.path().to_path_buf();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(OVERRIDE_PREFIX));

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, build_override(TABLE, "db10", "127.0.0.1"));
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);

        drop(hosts_override);
        assert!(!path.exists());
    }

    #[test]
    fn test_create_missing_table_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = HostsOverride::create(&dir.path().join("missing"), "db1", "127.0.0.1").unwrap_err();
        assert!(matches!(err, ExecutionError::HostsTable { .. }));
    }
}
