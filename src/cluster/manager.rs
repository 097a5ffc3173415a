//! Resource management over the cluster API.
//!
//! [`ResourceOps`] is the seam between the diff/deletion engine and the
//! remote store: the engine is written against the trait, and
//! [`ClusterManager`] implements it over [`ClusterClient`].

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::engine::{Action, Change};
use crate::error::ClusterError;
use crate::resource::{ResourceId, ResourceObject, specs_match};

use super::client::ClusterClient;

/// Options carried on every delete call. The instance identity and the
/// initiator are propagated to the server for ownership/audit labeling.
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    /// Name of the owning instance.
    pub instance: String,
    /// Namespace of the owning instance.
    pub namespace: String,
    /// Identity of the machine issuing the deletion.
    pub initiator: String,
}

impl DeleteOptions {
    /// Creates delete options scoped to an instance, with the local
    /// hostname as initiator.
    #[must_use]
    pub fn for_instance(instance: &str, namespace: &str) -> Self {
        let initiator = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| String::from("unknown"));
        Self {
            instance: instance.to_string(),
            namespace: namespace.to_string(),
            initiator,
        }
    }
}

/// Result of a server-side dry-run diff for one resource.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    /// The classified change.
    pub change: Change,
    /// Live manifest, when the resource exists.
    pub live: Option<Value>,
    /// Merged manifest, when a merge was computed.
    pub merged: Option<Value>,
}

/// Operations the engine needs from the remote store.
///
/// Errors from `diff` and `delete` are typed so that an immutable-field
/// conflict is distinguishable from generic failures.
#[async_trait]
pub trait ResourceOps: Send + Sync {
    /// Classifies the change a real apply would make for one resource,
    /// via a server-side dry-run merge. Never mutates the store.
    async fn diff(&self, object: &ResourceObject) -> Result<DiffOutcome, ClusterError>;

    /// Deletes one resource.
    async fn delete(
        &self,
        object: &ResourceObject,
        opts: &DeleteOptions,
    ) -> Result<Change, ClusterError>;

    /// Returns true if the resource currently exists on the cluster.
    async fn exists(&self, id: &ResourceId) -> Result<bool, ClusterError>;

    /// Returns true if the namespace exists on the cluster.
    async fn namespace_exists(&self, namespace: &str) -> Result<bool, ClusterError>;
}

/// [`ResourceOps`] implementation backed by the cluster API.
#[derive(Debug, Clone)]
pub struct ClusterManager {
    client: ClusterClient,
}

impl ClusterManager {
    /// Creates a new manager over the given client.
    #[must_use]
    pub const fn new(client: ClusterClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceOps for ClusterManager {
    async fn diff(&self, object: &ResourceObject) -> Result<DiffOutcome, ClusterError> {
        let Some(live) = self.client.get_resource(object.id()).await? else {
            return Ok(DiffOutcome {
                change: Change::new(Action::Created, object.id().clone()),
                live: None,
                merged: None,
            });
        };

        let merged = self.client.dry_run_apply(object).await?;
        let action = if specs_match(&live, &merged) {
            Action::Unchanged
        } else {
            Action::Configured
        };

        Ok(DiffOutcome {
            change: Change::new(action, object.id().clone()),
            live: Some(live),
            merged: Some(merged),
        })
    }

    async fn delete(
        &self,
        object: &ResourceObject,
        opts: &DeleteOptions,
    ) -> Result<Change, ClusterError> {
        match self.client.delete_resource(object.id(), opts).await {
            Ok(()) => Ok(Change::new(Action::Deleted, object.id().clone())),
            Err(e) if e.is_not_found() => {
                debug!("{object} was already deleted");
                Ok(Change::new(Action::Deleted, object.id().clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn exists(&self, id: &ResourceId) -> Result<bool, ClusterError> {
        Ok(self.client.get_resource(id).await?.is_some())
    }

    async fn namespace_exists(&self, namespace: &str) -> Result<bool, ClusterError> {
        self.client.namespace_exists(namespace).await
    }
}
