//! Wire types for the broker's directory API.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! broker's responses is ignored. Boundary omits empty collections from its
//! JSON, so every list field defaults to empty.

use serde::Deserialize;

/// Envelope used by all list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    /// Listed items, in the order the broker returned them.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// An authentication method configured on the broker.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthMethod {
    /// Auth method ID (e.g. `ampw_1234567890`).
    pub id: String,
    /// Method type passed to `boundary authenticate` (`password`, `oidc`, ...).
    #[serde(rename = "type")]
    pub method_type: String,
    /// Whether this is the scope's primary auth method.
    #[serde(default)]
    pub is_primary: bool,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// One item of the target listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetSummary {
    /// Target ID.
    pub id: String,
    /// Target name, unique within its scope.
    #[serde(default)]
    pub name: String,
    /// Scope the target lives in.
    #[serde(default)]
    pub scope_id: Option<String>,
}

/// A target as returned by the point lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    /// Target ID.
    pub id: String,
    /// Target name.
    #[serde(default)]
    pub name: String,
    /// Host sources attached to the target, in attachment order.
    #[serde(default)]
    pub host_sources: Vec<HostSourceRef>,
}

/// Reference from a target to one of its host sources.
#[derive(Debug, Clone, Deserialize)]
pub struct HostSourceRef {
    /// Host set ID.
    pub id: String,
    /// Catalog owning the host set.
    #[serde(default)]
    pub host_catalog_id: Option<String>,
}

/// A host set (host source).
#[derive(Debug, Clone, Deserialize)]
pub struct HostSet {
    /// Host set ID.
    pub id: String,
    /// Member host IDs, in listed order.
    #[serde(default)]
    pub host_ids: Vec<String>,
}

/// A host.
#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    /// Host ID.
    pub id: String,
    /// Host name. Hosts without a name never match a hostname.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Catalog owning the host.
    #[serde(default)]
    pub host_catalog_id: Option<String>,
}

impl Host {
    /// Whether this host's name equals `hostname`.
    pub fn is_named(&self, hostname: &str) -> bool {
        self.name.as_deref() == Some(hostname)
    }
}
