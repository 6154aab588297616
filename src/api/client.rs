//! HTTP client for the broker's directory API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};

use crate::config::BrokerConfig;

/// Builds requests against one broker.
///
/// The client carries no credential: callers attach the bearer token to each
/// request themselves so the token in use is always explicit.
#[derive(Debug, Clone)]
pub struct BrokerClient {
    http: reqwest::Client,
    base: String,
    scope_id: String,
}

impl BrokerClient {
    /// Create a client for the broker described by `config`.
    pub fn new(config: &BrokerConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()?;

        Ok(Self {
            http,
            base: config.addr.trim_end_matches('/').to_string(),
            scope_id: config.scope_id.clone(),
        })
    }

    /// Broker base address without trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Scope used for listings.
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// `GET /v1/auth-methods?scope_id=<scope>`
    pub fn list_auth_methods(&self) -> RequestBuilder {
        self.http
            .get(format!("{}/v1/auth-methods", self.base))
            .query(&[("scope_id", self.scope_id.as_str())])
    }

    /// `GET /v1/targets?scope_id=<scope>&recursive=true`
    pub fn list_targets(&self) -> RequestBuilder {
        self.http
            .get(format!("{}/v1/targets", self.base))
            .query(&[("scope_id", self.scope_id.as_str()), ("recursive", "true")])
    }

    /// `GET /v1/targets/{id}`
    pub fn get_target(&self, target_id: &str) -> RequestBuilder {
        self.http.get(format!("{}/v1/targets/{}", self.base, target_id))
    }

    /// `GET /v1/host-sets/{id}`
    pub fn get_host_set(&self, host_set_id: &str) -> RequestBuilder {
        self.http
            .get(format!("{}/v1/host-sets/{}", self.base, host_set_id))
    }

    /// `GET /v1/hosts/{id}`
    pub fn get_host(&self, host_id: &str) -> RequestBuilder {
        self.http.get(format!("{}/v1/hosts/{}", self.base, host_id))
    }
}

/// Whether the broker rejected a request as unauthenticated.
pub fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Body of an error response, trimmed, for diagnostics.
///
/// A body that cannot be read is described rather than dropped.
pub async fn error_body(response: Response) -> String {
    describe_body(response.text().await)
}

fn describe_body(body: Result<String, reqwest::Error>) -> String {
    match body {
        Ok(text) => text.trim().to_string(),
        Err(e) => format!("<failed to read response body: {}>", e),
    }
}
