//! Cluster API client implementation.
//!
//! This module provides the HTTP client for the remote cluster store's
//! REST API: resource reads, server-side dry-run merges, deletions, and
//! instance records.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::cluster::manager::DeleteOptions;
use crate::error::ClusterError;
use crate::resource::{ResourceId, ResourceObject};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Server-side rejection reason for immutable-field conflicts.
const REASON_FIELD_IMMUTABLE: &str = "FieldImmutable";

/// Cluster API client.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    /// HTTP client.
    http: Client,
    /// API server base URL, without a trailing slash.
    base_url: String,
    /// Bearer token.
    token: String,
}

/// Error body returned by the cluster API.
#[derive(Debug, Default, Deserialize)]
struct ApiStatusBody {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ClusterClient {
    /// Creates a new cluster API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(base_url: &str, token: &str) -> Result<Self, ClusterError> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_timeout(base_url: &str, token: &str, timeout_secs: u64) -> Result<Self, ClusterError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClusterError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Checks whether a namespace exists on the cluster.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than a missing namespace.
    pub async fn namespace_exists(&self, namespace: &str) -> Result<bool, ClusterError> {
        let url = format!("{}/v1/namespaces/{namespace}", self.base_url);
        let response = self.execute(self.http.get(&url).bearer_auth(&self.token)).await?;

        if response.status().as_u16() == 404 {
            return Ok(false);
        }
        Self::check(namespace, response).await?;
        Ok(true)
    }

    /// Fetches the live manifest of a resource, or `None` if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than a missing resource.
    pub async fn get_resource(&self, id: &ResourceId) -> Result<Option<Value>, ClusterError> {
        let response = self
            .execute(self.http.get(self.resource_url(id)).bearer_auth(&self.token))
            .await?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let response = Self::check(&id.to_string(), response).await?;
        let manifest = response.json().await.map_err(|e| ClusterError::InvalidResponse {
            message: format!("Failed to parse resource manifest: {e}"),
        })?;
        Ok(Some(manifest))
    }

    /// Requests a server-side dry-run merge of the desired manifest into
    /// live state and returns the merged manifest. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::ImmutableField`] if the server rejects the
    /// merge because a field cannot change post-creation.
    pub async fn dry_run_apply(&self, object: &ResourceObject) -> Result<Value, ClusterError> {
        trace!("Dry-run merge for {object}");
        let response = self
            .execute(
                self.http
                    .put(self.resource_url(object.id()))
                    .bearer_auth(&self.token)
                    .query(&[("dryRun", "true")])
                    .json(object.manifest()),
            )
            .await?;

        let response = Self::check(&object.id().to_string(), response).await?;
        response.json().await.map_err(|e| ClusterError::InvalidResponse {
            message: format!("Failed to parse merged manifest: {e}"),
        })
    }

    /// Deletes a resource, tagging the request with the owning instance
    /// and the initiator for server-side auditing.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFound`] if the resource is already gone.
    pub async fn delete_resource(
        &self,
        id: &ResourceId,
        opts: &DeleteOptions,
    ) -> Result<(), ClusterError> {
        debug!("Deleting {id}");
        let response = self
            .execute(
                self.http
                    .delete(self.resource_url(id))
                    .bearer_auth(&self.token)
                    .query(&[
                        ("instance", opts.instance.as_str()),
                        ("instanceNamespace", opts.namespace.as_str()),
                        ("initiator", opts.initiator.as_str()),
                    ]),
            )
            .await?;

        Self::check(&id.to_string(), response).await?;
        Ok(())
    }

    /// Fetches an instance record, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than a missing record.
    pub async fn get_instance_record(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<Option<Value>, ClusterError> {
        let url = self.instance_url(name, namespace);
        let response = self.execute(self.http.get(&url).bearer_auth(&self.token)).await?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let subject = format!("{namespace}/{name}");
        let response = Self::check(&subject, response).await?;
        let record = response.json().await.map_err(|e| ClusterError::InvalidResponse {
            message: format!("Failed to parse instance record: {e}"),
        })?;
        Ok(Some(record))
    }

    /// Deletes an instance record.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFound`] if no record exists.
    pub async fn delete_instance_record(
        &self,
        name: &str,
        namespace: &str,
    ) -> Result<(), ClusterError> {
        debug!("Deleting instance record {namespace}/{name}");
        let url = self.instance_url(name, namespace);
        let response = self.execute(self.http.delete(&url).bearer_auth(&self.token)).await?;

        Self::check(&format!("{namespace}/{name}"), response).await?;
        Ok(())
    }

    fn resource_url(&self, id: &ResourceId) -> String {
        format!(
            "{}/v1/namespaces/{}/resources/{}/{}",
            self.base_url, id.namespace, id.kind, id.name
        )
    }

    fn instance_url(&self, name: &str, namespace: &str) -> String {
        format!("{}/v1/namespaces/{namespace}/instances/{name}", self.base_url)
    }

    /// Sends a request, retrying transient failures.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClusterError> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                debug!("Retry attempt {attempt} of {MAX_RETRIES}");
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)))
                    .await;
            }

            let Some(attempt_request) = request.try_clone() else {
                break;
            };

            match attempt_request.send().await {
                Ok(response) if response.status().as_u16() == 429 => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(60);
                    last_error = Some(ClusterError::RateLimited {
                        retry_after_secs: retry_after,
                    });
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = Some(ClusterError::network(format!("Request failed: {e}")));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ClusterError::network("Request could not be retried")))
    }

    /// Maps error statuses to typed errors; passes successful responses
    /// through.
    async fn check(subject: &str, response: Response) -> Result<Response, ClusterError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 | 403 => Err(ClusterError::AuthenticationFailed {
                message: String::from("Invalid or expired cluster token"),
            }),
            404 => Err(ClusterError::NotFound {
                subject: subject.to_string(),
            }),
            409 => {
                let body: ApiStatusBody = response.json().await.unwrap_or_default();
                let message = body.message.unwrap_or_else(|| String::from("conflict"));
                if body.reason.as_deref() == Some(REASON_FIELD_IMMUTABLE) {
                    Err(ClusterError::ImmutableField {
                        subject: subject.to_string(),
                        message,
                    })
                } else {
                    Err(ClusterError::api_error(409, message))
                }
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(ClusterError::api_error(code, body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn object() -> ResourceObject {
        ResourceObject::from_manifest(
            json!({
                "kind": "Service",
                "metadata": { "name": "gateway", "namespace": "apps" },
                "spec": { "port": 8080 },
            }),
            "apps",
        )
        .expect("valid manifest")
    }

    async fn client_for(server: &MockServer) -> ClusterClient {
        ClusterClient::new(&server.uri(), "test-token").expect("client builds")
    }

    #[tokio::test]
    async fn test_get_resource_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/namespaces/apps/resources/Service/gateway"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let live = client
            .get_resource(&ResourceId::new("Service", "apps", "gateway"))
            .await
            .expect("get succeeds");
        assert!(live.is_none());
    }

    #[tokio::test]
    async fn test_dry_run_apply_returns_merged_manifest() {
        let server = MockServer::start().await;
        let merged = json!({
            "kind": "Service",
            "metadata": { "name": "gateway", "namespace": "apps" },
            "spec": { "port": 8080 },
        });
        Mock::given(method("PUT"))
            .and(path("/v1/namespaces/apps/resources/Service/gateway"))
            .and(query_param("dryRun", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(merged.clone()))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.dry_run_apply(&object()).await.expect("merge succeeds");
        assert_eq!(result, merged);
    }

    #[tokio::test]
    async fn test_immutable_conflict_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/namespaces/apps/resources/Service/gateway"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "reason": "FieldImmutable",
                "message": "spec.clusterIP may not be changed",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.dry_run_apply(&object()).await.unwrap_err();
        assert!(err.is_immutable());
    }

    #[tokio::test]
    async fn test_generic_conflict_is_not_immutable() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/namespaces/apps/resources/Service/gateway"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "reason": "Conflict",
                "message": "operation in progress",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.dry_run_apply(&object()).await.unwrap_err();
        assert!(!err.is_immutable());
        assert!(matches!(err, ClusterError::ApiRequestFailed { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_delete_carries_audit_params() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/namespaces/apps/resources/Service/gateway"))
            .and(query_param("instance", "podinfo"))
            .and(query_param("instanceNamespace", "apps"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let opts = DeleteOptions {
            instance: String::from("podinfo"),
            namespace: String::from("apps"),
            initiator: String::from("test-host"),
        };
        client
            .delete_resource(&ResourceId::new("Service", "apps", "gateway"), &opts)
            .await
            .expect("delete succeeds");
    }

    #[tokio::test]
    async fn test_auth_failure_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/namespaces/apps"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.namespace_exists("apps").await.unwrap_err();
        assert!(matches!(err, ClusterError::AuthenticationFailed { .. }));
    }
}
