//! Instance record types.
//!
//! An instance is a named, namespaced aggregate owning an ordered set of
//! resources. The record stores only resource identities, in apply
//! order; that stored sequence encodes dependency precedence, and
//! deletion later reverses it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resource::{ResourceId, ResourceObject};

/// Current version of the instance record format.
pub const RECORD_VERSION: &str = "v1";

/// A persisted instance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Record format version.
    #[serde(default)]
    pub version: String,
    /// Instance name.
    pub name: String,
    /// Instance namespace.
    pub namespace: String,
    /// Identities of the owned resources, in apply order.
    pub inventory: Vec<InventoryEntry>,
    /// Digest of the inventory, for drift-at-a-glance display.
    pub digest: String,
    /// When the instance was first applied.
    pub created_at: DateTime<Utc>,
    /// When the instance was last applied.
    pub last_applied: DateTime<Utc>,
}

/// Identity of one owned resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Resource kind.
    pub kind: String,
    /// Resource namespace.
    pub namespace: String,
    /// Resource name.
    pub name: String,
}

impl InventoryEntry {
    /// Returns the entry as a [`ResourceId`].
    #[must_use]
    pub fn id(&self) -> ResourceId {
        ResourceId::new(self.kind.clone(), self.namespace.clone(), self.name.clone())
    }
}

impl From<&ResourceId> for InventoryEntry {
    fn from(id: &ResourceId) -> Self {
        Self {
            kind: id.kind.clone(),
            namespace: id.namespace.clone(),
            name: id.name.clone(),
        }
    }
}

impl Instance {
    /// Builds a new instance record owning the given objects, in the
    /// given apply order.
    #[must_use]
    pub fn new(name: &str, namespace: &str, objects: &[ResourceObject]) -> Self {
        let inventory: Vec<InventoryEntry> =
            objects.iter().map(|o| InventoryEntry::from(o.id())).collect();
        let digest = Self::inventory_digest(&inventory);
        let now = Utc::now();
        Self {
            version: RECORD_VERSION.to_string(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            inventory,
            digest,
            created_at: now,
            last_applied: now,
        }
    }

    /// Rebuilds the ordered resource list from the inventory, as
    /// identity stubs.
    #[must_use]
    pub fn list_objects(&self) -> Vec<ResourceObject> {
        self.inventory
            .iter()
            .map(|entry| ResourceObject::from_id(entry.id()))
            .collect()
    }

    /// Returns true if the inventory contains the given identity.
    #[must_use]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.inventory.iter().any(|entry| entry.id() == *id)
    }

    /// Computes the deterministic digest of an inventory.
    #[must_use]
    pub fn inventory_digest(inventory: &[InventoryEntry]) -> String {
        let mut hasher = Sha256::new();
        for entry in inventory {
            hasher.update(entry.kind.as_bytes());
            hasher.update(b"/");
            hasher.update(entry.namespace.as_bytes());
            hasher.update(b"/");
            hasher.update(entry.name.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    /// Returns the first 12 hex characters of the digest.
    #[must_use]
    pub fn short_digest(&self) -> &str {
        &self.digest[..self.digest.len().min(12)]
    }
}
