//! Dynamic resource representation.
//!
//! Resources are arbitrary structured documents. Identity (kind, namespace,
//! name) is extracted explicitly at construction time; everything else stays
//! an opaque manifest that is compared structurally, never by identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ResourceError;

/// Marker key that opts a resource into delete-then-recreate when the
/// server rejects a merge with an immutable-field conflict. Honored in
/// both `metadata.annotations` and `metadata.labels`.
pub const FORCE_MARKER: &str = "veld.dev/force";

/// Marker value that enables the force behavior.
pub const FORCE_ENABLED: &str = "enabled";

/// Metadata fields owned by the server. Stripped before any structural
/// comparison so that server bookkeeping never counts as drift.
const SERVER_MANAGED_METADATA: [&str; 5] = [
    "resourceVersion",
    "uid",
    "generation",
    "creationTimestamp",
    "managedFields",
];

/// Identity of a managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource kind.
    pub kind: String,
    /// Resource namespace.
    pub namespace: String,
    /// Resource name.
    pub name: String,
}

impl ResourceId {
    /// Creates a new resource identity.
    #[must_use]
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// A declaratively-described resource: identity plus full manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObject {
    id: ResourceId,
    manifest: Value,
}

impl ResourceObject {
    /// Builds a resource from a manifest document.
    ///
    /// `kind` and `metadata.name` are required; a missing
    /// `metadata.namespace` falls back to `default_namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required identity field is missing or empty.
    pub fn from_manifest(manifest: Value, default_namespace: &str) -> Result<Self, ResourceError> {
        let kind = required_string(&manifest, "kind")?;
        let name = required_string(manifest.pointer("/metadata").unwrap_or(&Value::Null), "name")
            .map_err(|_| ResourceError::MissingField {
                field: String::from("metadata.name"),
            })?;

        let namespace = manifest
            .pointer("/metadata/namespace")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_namespace)
            .to_string();

        Ok(Self {
            id: ResourceId::new(kind, namespace, name),
            manifest,
        })
    }

    /// Builds an identity-only stub, used when rehydrating resources from
    /// an instance inventory where only identities are stored.
    #[must_use]
    pub fn from_id(id: ResourceId) -> Self {
        let manifest = json!({
            "kind": id.kind,
            "metadata": {
                "name": id.name,
                "namespace": id.namespace,
            },
        });
        Self { id, manifest }
    }

    /// Returns the resource identity.
    #[must_use]
    pub const fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Returns the resource kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.id.kind
    }

    /// Returns the resource namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.id.namespace
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// Returns the full manifest document.
    #[must_use]
    pub const fn manifest(&self) -> &Value {
        &self.manifest
    }

    /// Returns true if the resource carries the force marker in either
    /// `metadata.annotations` or `metadata.labels`.
    #[must_use]
    pub fn has_force_marker(&self) -> bool {
        ["/metadata/annotations", "/metadata/labels"]
            .iter()
            .filter_map(|path| self.manifest.pointer(path))
            .filter_map(|section| section.get(FORCE_MARKER))
            .any(|value| value.as_str() == Some(FORCE_ENABLED))
    }
}

impl fmt::Display for ResourceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// Returns a copy of the manifest with server-managed fields removed.
///
/// Strips `status` and server-owned `metadata` bookkeeping so that two
/// snapshots compare equal exactly when their server-relevant fields match.
#[must_use]
pub fn strip_server_fields(manifest: &Value) -> Value {
    let mut stripped = manifest.clone();
    if let Some(map) = stripped.as_object_mut() {
        map.remove("status");
        if let Some(metadata) = map.get_mut("metadata").and_then(Value::as_object_mut) {
            for field in SERVER_MANAGED_METADATA {
                metadata.remove(field);
            }
        }
    }
    stripped
}

/// Structural equality of the server-relevant fields of two snapshots.
#[must_use]
pub fn specs_match(live: &Value, merged: &Value) -> bool {
    strip_server_fields(live) == strip_server_fields(merged)
}

fn required_string(value: &Value, field: &str) -> Result<String, ResourceError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| ResourceError::MissingField {
            field: field.to_string(),
        })
}
