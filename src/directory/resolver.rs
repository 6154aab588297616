//! Target/host-source/host traversal against the broker directory.

use std::sync::{Arc, Mutex};

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::error::ResolutionError;
use super::memo::Memo;
use crate::api::{error_body, is_auth_failure, BrokerClient, Host, HostSet, ListResponse, Target, TargetSummary};
use crate::auth::{AuthError, CredentialManager, Token};
use crate::telemetry::{self, AuditEvent};

/// Broker identifiers for a resolved (hostname, target) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// ID of the matching host.
    pub host_id: String,
    /// ID of the target the host was found through.
    pub target_id: String,
}

/// Resolves names to broker identifiers with memoized point lookups.
pub struct DirectoryResolver {
    client: BrokerClient,
    credentials: CredentialManager,
    /// Credential attached to every request; replaced only on re-authentication.
    token: Mutex<Token>,
    targets: Memo<Arc<Target>>,
    host_sets: Memo<Arc<HostSet>>,
    hosts: Memo<Arc<Host>>,
}

impl DirectoryResolver {
    /// Create a resolver using `token` until the broker rejects it.
    pub fn new(client: BrokerClient, credentials: CredentialManager, token: Token) -> Self {
        Self {
            client,
            credentials,
            token: Mutex::new(token),
            targets: Memo::new(),
            host_sets: Memo::new(),
            hosts: Memo::new(),
        }
    }

    /// Create a resolver with a token obtained from `credentials`.
    pub async fn connect(
        client: BrokerClient,
        credentials: CredentialManager,
    ) -> Result<Self, AuthError> {
        let token = credentials.get_token().await?;
        Ok(Self::new(client, credentials, token))
    }

    /// Find the first host named `hostname` reachable through a target named
    /// `target_name`.
    ///
    /// Targets are scanned in listing order, host sources in attachment order
    /// and hosts in host-set order. Returns `None` when nothing matches.
    pub async fn resolve(
        &self,
        hostname: &str,
        target_name: &str,
    ) -> Result<Option<Resolution>, ResolutionError> {
        let summaries = self.list_targets().await?;
        debug!("Broker lists {} targets", summaries.len());

        for summary in summaries.iter().filter(|t| t.name == target_name) {
            let target = self.get_target(&summary.id).await?;
            for source in &target.host_sources {
                let hosts = self.get_hosts(&source.id).await?;
                if let Some(host) = hosts.iter().find(|h| h.is_named(hostname)) {
                    info!(
                        "Resolved {} via target {} to host {} (host set {})",
                        hostname, target.id, host.id, source.id
                    );
                    telemetry::record(AuditEvent::TargetResolved {
                        hostname: hostname.to_string(),
                        target: target_name.to_string(),
                        host_id: host.id.clone(),
                        target_id: target.id.clone(),
                    });
                    return Ok(Some(Resolution {
                        host_id: host.id.clone(),
                        target_id: target.id.clone(),
                    }));
                }
            }
        }

        debug!("No host {} behind any target named {}", hostname, target_name);
        Ok(None)
    }

    /// List all targets in the configured scope, recursively.
    pub async fn list_targets(&self) -> Result<Vec<TargetSummary>, ResolutionError> {
        let list: ListResponse<TargetSummary> = self
            .request_json("targets", || self.client.list_targets())
            .await?;
        Ok(list.items)
    }

    /// Fetch a target by ID (memoized).
    pub async fn get_target(&self, target_id: &str) -> Result<Arc<Target>, ResolutionError> {
        self.targets
            .get_or_try_init(target_id, || async {
                let target: Target = self
                    .request_json("target", || self.client.get_target(target_id))
                    .await?;
                Ok::<_, ResolutionError>(Arc::new(target))
            })
            .await
    }

    /// Fetch a host set by ID (memoized).
    pub async fn get_host_set(&self, host_set_id: &str) -> Result<Arc<HostSet>, ResolutionError> {
        self.host_sets
            .get_or_try_init(host_set_id, || async {
                let set: HostSet = self
                    .request_json("host set", || self.client.get_host_set(host_set_id))
                    .await?;
                Ok::<_, ResolutionError>(Arc::new(set))
            })
            .await
    }

    /// Expand a host set to its member hosts, in listed order.
    ///
    /// Both the host set and each host are memoized, so repeating this for a
    /// seen host set issues no requests.
    pub async fn get_hosts(&self, host_set_id: &str) -> Result<Vec<Arc<Host>>, ResolutionError> {
        let set = self.get_host_set(host_set_id).await?;
        let mut hosts = Vec::with_capacity(set.host_ids.len());
        for host_id in &set.host_ids {
            hosts.push(self.get_host(host_id).await?);
        }
        Ok(hosts)
    }

    /// Fetch a host by ID (memoized).
    pub async fn get_host(&self, host_id: &str) -> Result<Arc<Host>, ResolutionError> {
        self.hosts
            .get_or_try_init(host_id, || async {
                let host: Host = self
                    .request_json("host", || self.client.get_host(host_id))
                    .await?;
                Ok::<_, ResolutionError>(Arc::new(host))
            })
            .await
    }

    /// Send a request with the current credential and decode the JSON body.
    ///
    /// `request` must build the same logical request each time it is called;
    /// it is called a second time only after a 401/403 and a credential refresh.
    async fn request_json<T, F>(
        &self,
        operation: &'static str,
        request: F,
    ) -> Result<T, ResolutionError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut refreshed = false;
        loop {
            let token = self.current_token();
            let response = request()
                .bearer_auth(token.as_str())
                .send()
                .await
                .map_err(|source| ResolutionError::Transport { operation, source })?;

            let status = response.status();
            if status.is_success() {
                return response
                    .json::<T>()
                    .await
                    .map_err(|source| ResolutionError::Decode { operation, source });
            }

            if is_auth_failure(status) {
                if refreshed {
                    return Err(ResolutionError::Unauthorized {
                        operation,
                        status: status.as_u16(),
                    });
                }
                warn!(
                    "Boundary rejected {} request with {}, re-authenticating",
                    operation, status
                );
                self.refresh_credentials().await?;
                refreshed = true;
                continue;
            }

            return Err(ResolutionError::Status {
                operation,
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }
    }

    /// Re-authenticate and adopt the token store's new token.
    async fn refresh_credentials(&self) -> Result<(), AuthError> {
        self.credentials.authenticate().await?;
        let token = self.credentials.get_token().await?;
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = token;
        Ok(())
    }

    fn current_token(&self) -> Token {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
