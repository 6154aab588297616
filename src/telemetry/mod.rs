//! Telemetry and audit logging for boundary-proxy.
//!
//! This module provides structured logging to syslog with the `BOUNDARY_PROXY` tag.
//! Each step of a brokered connection is recorded for audit trails.
//!
//! # Architecture
//!
//! - **Audit logging** (syslog): session events go to syslog, never stdout/stderr
//! - **Debug logging** (tracing): Development logs go to stderr via `tracing`
//! - These are completely separate concerns
//!
//! # Usage
//!
//! ```ignore
//! use boundary_proxy::telemetry::{self, AuditEvent};
//!
//! // Initialize at startup
//! telemetry::init_logger()?;
//!
//! // Record events throughout the application
//! telemetry::record(AuditEvent::ProxyStopped { port: 45678 });
//! ```
//!
//! Recording before initialization is a no-op, so library code and tests never
//! need a syslog daemon.
//!
//! # Event Format
//!
//! Events are logged as JSON with an ISO8601 timestamp:
//!
//! ```json
//! {"ts":"2026-01-07T14:32:01Z","event":"proxy_started","host_id":"hst_2","target_id":"ttcp_db","port":45678,"session_id":null}
//! ```

mod error;
mod events;
mod syslog;

pub use error::TelemetryError;
pub use events::AuditEvent;
pub use syslog::{init_logger, init_null_logger, record, try_audit, AuditLogger, SYSLOG_TAG};
