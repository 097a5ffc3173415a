//! Diff engine for classifying desired resources against live state.
//!
//! The engine asks the remote store for a server-side dry-run merge and
//! turns the result into an [`Action`], applying the namespace
//! short-circuit and the force-marker policy for immutable conflicts.

use serde_json::Value;
use tracing::debug;

use crate::cluster::ResourceOps;
use crate::engine::{Action, Change};
use crate::error::ClusterError;
use crate::resource::ResourceObject;

/// Classification of a single resource, with optional before/after
/// snapshots for detail rendering.
#[derive(Debug, Clone)]
pub struct ResourceDiff {
    /// The classified change.
    pub change: Change,
    /// Live manifest, when the resource exists.
    pub live: Option<Value>,
    /// Merged manifest, when a merge was computed.
    pub merged: Option<Value>,
}

impl ResourceDiff {
    /// Returns the classified action.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.change.action
    }

    /// Returns the (live, merged) snapshot pair when both were
    /// materialized.
    #[must_use]
    pub const fn snapshots(&self) -> Option<(&Value, &Value)> {
        match (&self.live, &self.merged) {
            (Some(live), Some(merged)) => Some((live, merged)),
            _ => None,
        }
    }

    fn bare(action: Action, object: &ResourceObject) -> Self {
        Self {
            change: Change::new(action, object.id().clone()),
            live: None,
            merged: None,
        }
    }
}

/// Engine for classifying the action required for each desired resource.
#[derive(Debug)]
pub struct DiffEngine<'a, R: ResourceOps> {
    ops: &'a R,
}

impl<'a, R: ResourceOps> DiffEngine<'a, R> {
    /// Creates a new diff engine over the given store operations.
    #[must_use]
    pub const fn new(ops: &'a R) -> Self {
        Self { ops }
    }

    /// Classifies one resource against live state.
    ///
    /// `namespace_exists` is evaluated once per run by the caller; when
    /// false the store is not contacted and the resource classifies as
    /// `Created`.
    ///
    /// Immutable-field conflicts classify as `Created` when the resource
    /// carries the force marker (the caller is expected to
    /// delete-then-recreate) and as `ImmutableConflict` otherwise. Any
    /// other store error propagates; the caller logs it and continues
    /// with the next resource.
    ///
    /// # Errors
    ///
    /// Returns the store error for failures other than immutable-field
    /// conflicts.
    pub async fn diff(
        &self,
        object: &ResourceObject,
        namespace_exists: bool,
    ) -> Result<ResourceDiff, ClusterError> {
        if !namespace_exists {
            return Ok(ResourceDiff::bare(Action::Created, object));
        }

        match self.ops.diff(object).await {
            Ok(outcome) => Ok(ResourceDiff {
                change: outcome.change,
                live: outcome.live,
                merged: outcome.merged,
            }),
            Err(e) if e.is_immutable() => {
                if object.has_force_marker() {
                    debug!("{object} has the force marker, scheduling recreation");
                    Ok(ResourceDiff::bare(Action::Created, object))
                } else {
                    Ok(ResourceDiff::bare(Action::ImmutableConflict, object))
                }
            }
            Err(e) => Err(e),
        }
    }
}
