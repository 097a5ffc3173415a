//! Resource model for the veld instance lifecycle manager.
//!
//! This module provides the dynamic resource representation and the
//! manifest loader that turns declarative YAML into ordered resource
//! lists.

mod loader;
mod object;

pub use loader::{load_manifest_file, load_manifests};
pub use object::{
    FORCE_ENABLED, FORCE_MARKER, ResourceId, ResourceObject, specs_match, strip_server_fields,
};
