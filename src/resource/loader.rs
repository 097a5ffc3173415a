//! Manifest loading.
//!
//! Desired resources arrive as multi-document YAML. Document order is
//! preserved: it is the canonical apply order, and deletion later reverses
//! it.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ResourceError, Result};

use super::object::ResourceObject;

/// Parses a multi-document YAML string into an ordered resource list.
///
/// Empty documents are skipped. Objects without a namespace inherit
/// `default_namespace`.
///
/// # Errors
///
/// Returns an error if a document fails to parse, is missing identity
/// fields, or duplicates the identity of an earlier document.
pub fn load_manifests(
    input: &str,
    default_namespace: &str,
) -> std::result::Result<Vec<ResourceObject>, ResourceError> {
    let mut objects = Vec::new();
    let mut seen = HashSet::new();

    for document in serde_yaml::Deserializer::from_str(input) {
        let value =
            Value::deserialize(document).map_err(|e| ResourceError::invalid(e.to_string()))?;
        if value.is_null() {
            continue;
        }

        let object = ResourceObject::from_manifest(value, default_namespace)?;
        if !seen.insert(object.id().clone()) {
            return Err(ResourceError::DuplicateResource {
                subject: object.id().to_string(),
            });
        }
        objects.push(object);
    }

    debug!("Loaded {} manifest document(s)", objects.len());
    Ok(objects)
}

/// Reads and parses a manifest file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any document is invalid.
pub fn load_manifest_file(path: &Path, default_namespace: &str) -> Result<Vec<ResourceObject>> {
    let input = std::fs::read_to_string(path)?;
    Ok(load_manifests(&input, default_namespace)?)
}
