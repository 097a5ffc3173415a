//! Instance record storage.
//!
//! Instance records live in the cluster store itself, alongside the
//! resources they describe. The storage trait is the seam the command
//! layer uses; a missing record is a fail-fast precondition error.

use async_trait::async_trait;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::error::{InstanceError, Result};

use super::types::Instance;

/// Trait for instance record storage backends.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Fetches the instance record stored under `name` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::NotFound`] if no record exists.
    async fn get(&self, name: &str, namespace: &str) -> Result<Instance>;

    /// Deletes the instance record. Deleting an already-absent record is
    /// not an error.
    async fn delete(&self, name: &str, namespace: &str) -> Result<()>;
}

/// Instance storage backed by the cluster API.
#[derive(Debug, Clone)]
pub struct ClusterInstanceStore {
    client: ClusterClient,
}

impl ClusterInstanceStore {
    /// Creates a new store over the given client.
    #[must_use]
    pub const fn new(client: ClusterClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstanceStore for ClusterInstanceStore {
    async fn get(&self, name: &str, namespace: &str) -> Result<Instance> {
        let Some(record) = self.client.get_instance_record(name, namespace).await? else {
            return Err(InstanceError::NotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }
            .into());
        };

        let instance = serde_json::from_value(record).map_err(|e| InstanceError::Corrupted {
            message: e.to_string(),
        })?;
        Ok(instance)
    }

    async fn delete(&self, name: &str, namespace: &str) -> Result<()> {
        match self.client.delete_instance_record(name, namespace).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("instance record {namespace}/{name} was already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
