//! Broker directory API.
//!
//! Thin HTTP layer over the Boundary controller's JSON API. Request builders
//! are produced by [`BrokerClient`]; credential injection, retry on
//! authentication failure and memoization live in the callers
//! ([`crate::auth`] and [`crate::directory`]).

mod client;
mod types;

pub use client::{error_body, is_auth_failure, BrokerClient};
pub use types::{AuthMethod, Host, HostSet, HostSourceRef, ListResponse, Target, TargetSummary};
