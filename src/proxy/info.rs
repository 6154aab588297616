//! Session description printed by `boundary connect -format json`.

use serde::Deserialize;

use super::error::ProxyError;

/// What `boundary connect` reports once its local listener is up.
///
/// Only `port` is required; the other fields are kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectInfo {
    /// Local listen address.
    #[serde(default)]
    pub address: Option<String>,
    /// Local listen port.
    pub port: u16,
    /// Tunneled protocol, e.g. `tcp`.
    #[serde(default)]
    pub protocol: Option<String>,
    /// Session expiration timestamp.
    #[serde(default)]
    pub expiration: Option<String>,
    /// Remaining connections allowed (-1 is unlimited).
    #[serde(default)]
    pub connection_limit: Option<i64>,
    /// Broker session ID.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ConnectInfo {
    /// Parse one line of output.
    pub fn parse(line: &str) -> Result<Self, ProxyError> {
        serde_json::from_str(line.trim()).map_err(|source| ProxyError::Parse {
            line: line.trim_end().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_description() {
        let info = ConnectInfo::parse(
            r#"{"address":"127.0.0.1","port":45678,"protocol":"tcp","expiration":"2026-10-19T20:00:00Z","connection_limit":-1,"session_id":"s_1234567890"}"#,
        )
        .unwrap();

        assert_eq!(info.port, 45678);
        assert_eq!(info.address.as_deref(), Some("127.0.0.1"));
        assert_eq!(info.connection_limit, Some(-1));
        assert_eq!(info.session_id.as_deref(), Some("s_1234567890"));
    }

    #[test]
    fn test_parse_port_only_with_unknown_fields() {
        let info = ConnectInfo::parse("{\"port\":5432,\"credentials\":[]}\n").unwrap();
        assert_eq!(info.port, 5432);
        assert_eq!(info.protocol, None);
    }

    #[test]
    fn test_missing_port_rejected() {
        let err = ConnectInfo::parse(r#"{"address":"127.0.0.1"}"#).unwrap_err();
        assert!(matches!(err, ProxyError::Parse { .. }));
    }

    #[test]
    fn test_non_json_rejected() {
        let err = ConnectInfo::parse("Error: session authorization failed").unwrap_err();
        match err {
            ProxyError::Parse { line, .. } => {
                assert_eq!(line, "Error: session authorization failed");
            }
            other => panic!("Expected Parse, got {:?}", other),
        }
    }
}
