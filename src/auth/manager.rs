//! Token retrieval and re-authentication through the `boundary` CLI.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::error::AuthError;
use super::token::Token;
use crate::api::{error_body, AuthMethod, BrokerClient, ListResponse};
use crate::telemetry::{self, AuditEvent};

/// Obtains bearer tokens and re-authenticates against the broker.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    client: BrokerClient,
    boundary_binary: PathBuf,
}

impl CredentialManager {
    /// Create a manager that discovers auth methods through `client` and runs
    /// `boundary_binary` for the token store and login flow.
    pub fn new(client: BrokerClient, boundary_binary: impl Into<PathBuf>) -> Self {
        Self {
            client,
            boundary_binary: boundary_binary.into(),
        }
    }

    /// Path of the `boundary` CLI in use.
    pub fn boundary_binary(&self) -> &Path {
        &self.boundary_binary
    }

    /// Return the token currently held by the token store, authenticating
    /// first if the store has none.
    ///
    /// The store is read on every call.
    pub async fn get_token(&self) -> Result<Token, AuthError> {
        if let Some(token) = self.read_token_store().await? {
            return Ok(token);
        }

        info!("No cached Boundary token, authenticating");
        self.authenticate().await?;

        self.read_token_store().await?.ok_or_else(|| {
            AuthError::TokenUnavailable("token store is empty after authentication".to_string())
        })
    }

    /// Authenticate with the scope's primary auth method.
    ///
    /// On success the token store has been updated by the `boundary` CLI.
    pub async fn authenticate(&self) -> Result<(), AuthError> {
        let method = self.primary_auth_method().await?;
        info!(
            "Authenticating with {} auth method {}",
            method.method_type, method.id
        );

        let auth_method_arg = format!("-auth-method-id={}", method.id);
        let output = Command::new(&self.boundary_binary)
            .arg("authenticate")
            .arg(&method.method_type)
            .arg(&auth_method_arg)
            // The login flow may prompt for a password or open a browser
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AuthError::Spawn {
                command: format!(
                    "{} authenticate {} {}",
                    self.boundary_binary.display(),
                    method.method_type,
                    auth_method_arg
                ),
                source: e,
            })?;

        if !output.status.success() {
            return Err(AuthError::Failed {
                method_id: method.id,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        telemetry::record(AuditEvent::AuthRefresh {
            method_id: method.id,
            method_type: method.method_type,
        });
        Ok(())
    }

    /// Query the broker for its auth methods and pick the primary one.
    async fn primary_auth_method(&self) -> Result<AuthMethod, AuthError> {
        let response = self
            .client
            .list_auth_methods()
            .send()
            .await
            .map_err(|e| AuthError::MethodDiscovery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::MethodDiscovery(format!(
                "status {}: {}",
                status.as_u16(),
                error_body(response).await
            )));
        }

        let methods: ListResponse<AuthMethod> = response
            .json()
            .await
            .map_err(|e| AuthError::MethodDiscovery(e.to_string()))?;
        debug!("Broker offers {} auth methods", methods.items.len());

        methods
            .items
            .into_iter()
            .find(|m| m.is_primary)
            .ok_or(AuthError::NoPrimaryMethod)
    }

    /// Run `boundary config get-token`.
    ///
    /// A non-zero exit or empty output means the store holds no token.
    async fn read_token_store(&self) -> Result<Option<Token>, AuthError> {
        let output = Command::new(&self.boundary_binary)
            .args(["config", "get-token"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AuthError::Spawn {
                command: format!("{} config get-token", self.boundary_binary.display()),
                source: e,
            })?;

        if !output.status.success() {
            debug!(
                "Token store returned {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        Ok(Token::new(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{broker_client, FakeBoundary};
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn mock_auth_methods(server: &MockServer, items: serde_json::Value) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/auth-methods")
                .query_param("scope_id", "global");
            then.status(200).json_body(json!({ "items": items }));
        })
    }

    #[tokio::test]
    async fn test_get_token_uses_cached_token() {
        let server = MockServer::start_async().await;
        let methods = mock_auth_methods(&server, json!([]));
        let boundary = FakeBoundary::new();
        boundary.set_token("at_cached");

        let manager = CredentialManager::new(broker_client(&server), boundary.path());
        let token = manager.get_token().await.unwrap();

        assert_eq!(token.as_str(), "at_cached");
        methods.assert_calls(0);
        assert!(boundary.auth_calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_token_authenticates_when_store_empty() {
        let server = MockServer::start_async().await;
        let methods = mock_auth_methods(
            &server,
            json!([
                {"id": "amoidc_1", "type": "oidc", "is_primary": false},
                {"id": "ampw_1", "type": "password", "is_primary": true}
            ]),
        );
        let boundary = FakeBoundary::new();
        boundary.set_next_token("at_fresh");

        let manager = CredentialManager::new(broker_client(&server), boundary.path());
        let token = manager.get_token().await.unwrap();

        assert_eq!(token.as_str(), "at_fresh");
        methods.assert_calls(1);
        assert_eq!(
            boundary.auth_calls(),
            vec!["password -auth-method-id=ampw_1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_no_primary_method() {
        let server = MockServer::start_async().await;
        mock_auth_methods(
            &server,
            json!([{"id": "amoidc_1", "type": "oidc", "is_primary": false}]),
        );
        let boundary = FakeBoundary::new();

        let manager = CredentialManager::new(broker_client(&server), boundary.path());
        let err = manager.get_token().await.unwrap_err();

        assert!(matches!(err, AuthError::NoPrimaryMethod));
        assert!(boundary.auth_calls().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate_failure_carries_stderr() {
        let server = MockServer::start_async().await;
        mock_auth_methods(
            &server,
            json!([{"id": "ampw_1", "type": "password", "is_primary": true}]),
        );
        let boundary = FakeBoundary::new();
        boundary.fail_auth("Error from controller when performing authentication");

        let manager = CredentialManager::new(broker_client(&server), boundary.path());
        let err = manager.authenticate().await.unwrap_err();

        match err {
            AuthError::Failed { method_id, stderr } => {
                assert_eq!(method_id, "ampw_1");
                assert!(stderr.contains("performing authentication"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_method_discovery_error_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/auth-methods");
            then.status(500).body("controller unavailable");
        });
        let boundary = FakeBoundary::new();

        let manager = CredentialManager::new(broker_client(&server), boundary.path());
        let err = manager.authenticate().await.unwrap_err();

        assert!(matches!(err, AuthError::MethodDiscovery(ref m) if m.contains("controller unavailable")));
    }

    #[tokio::test]
    async fn test_store_still_empty_after_authentication() {
        let server = MockServer::start_async().await;
        mock_auth_methods(
            &server,
            json!([{"id": "ampw_1", "type": "password", "is_primary": true}]),
        );
        // Authentication succeeds but never writes a token
        let boundary = FakeBoundary::new();

        let manager = CredentialManager::new(broker_client(&server), boundary.path());
        let err = manager.get_token().await.unwrap_err();

        assert!(matches!(err, AuthError::TokenUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let server = MockServer::start_async().await;
        let manager = CredentialManager::new(
            broker_client(&server),
            "/nonexistent/boundary-proxy-test/boundary",
        );
        let err = manager.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Spawn { .. }));
    }
}
