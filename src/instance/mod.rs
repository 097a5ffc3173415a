//! Instance records and their storage.
//!
//! Instances are the unit of lifecycle management: a named, namespaced
//! aggregate owning an ordered set of resources.

mod storage;
mod types;

pub use storage::{ClusterInstanceStore, InstanceStore};
pub use types::{Instance, InventoryEntry, RECORD_VERSION};
