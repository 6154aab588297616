//! Audit event types for structured logging.
//!
//! These events are logged to syslog with the `BOUNDARY_PROXY` tag so that
//! every brokered connection leaves an audit trail.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Audit events for one boundary-proxy invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Invocation started.
    SessionStart {
        /// Username of the person running the command.
        user: String,
        /// Hostname the command asked for.
        hostname: String,
        /// Target name the command asked for.
        target: String,
        /// Process ID of boundary-proxy.
        pid: u32,
    },

    /// Interactive re-authentication succeeded.
    AuthRefresh {
        /// Auth method used.
        method_id: String,
        /// Auth method type (password, oidc, ...).
        method_type: String,
    },

    /// Hostname and target name resolved to broker identifiers.
    TargetResolved {
        /// Requested hostname.
        hostname: String,
        /// Requested target name.
        target: String,
        /// Matching host ID.
        host_id: String,
        /// Matching target ID.
        target_id: String,
    },

    /// Local proxy is listening.
    ProxyStarted {
        /// Host the proxy tunnels to.
        host_id: String,
        /// Target the session was authorized for.
        target_id: String,
        /// Local proxy port.
        port: u16,
        /// Broker session ID, when reported.
        session_id: Option<String>,
    },

    /// Local proxy was shut down.
    ProxyStopped {
        /// Local proxy port.
        port: u16,
    },

    /// User command finished.
    CommandExit {
        /// Exit code reported to the caller.
        code: i32,
        /// Command run time in seconds.
        duration_sec: u64,
    },

    /// Invocation ended.
    SessionEnd {
        /// Username of the person who ran the command.
        user: String,
        /// Hostname the command asked for.
        hostname: String,
        /// Duration of the invocation in seconds.
        duration_sec: u64,
    },
}

/// Wrapper for serializing events with timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct TimestampedEvent<'a> {
    /// ISO8601 timestamp.
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,

    /// The actual event (flattened into this struct).
    #[serde(flatten)]
    pub event: &'a AuditEvent,
}

impl AuditEvent {
    /// Wrap this event with a timestamp for serialization.
    pub fn with_timestamp(&self) -> TimestampedEvent<'_> {
        TimestampedEvent {
            timestamp: Utc::now(),
            event: self,
        }
    }
}
