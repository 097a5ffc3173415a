//! Ordered deletion of an instance's resources.
//!
//! Deletion walks the inventory in the exact reverse of its canonical
//! apply order. A failed deletion never aborts the batch; it is counted
//! so the caller can withhold instance-record deletion and exit non-zero.

use tracing::{error, info};

use crate::cluster::{DeleteOptions, ResourceOps};
use crate::engine::{Action, Change, ChangeSet, DRY_RUN_CLIENT};
use crate::resource::ResourceObject;

/// Result of a deletion batch.
#[derive(Debug)]
pub struct DeletionOutcome {
    /// Changes recorded during the batch, in deletion order.
    pub changes: ChangeSet,
    /// Number of delete calls that failed.
    pub failed: usize,
    /// Number of delete calls that were attempted.
    pub attempted: usize,
}

impl DeletionOutcome {
    /// Returns true if at least one deletion failed. Gates instance-record
    /// deletion and termination waiting in the caller.
    #[must_use]
    pub const fn had_errors(&self) -> bool {
        self.failed > 0
    }
}

/// Orchestrator for deleting an instance's resource set.
#[derive(Debug)]
pub struct DeletionOrchestrator<'a, R: ResourceOps> {
    ops: &'a R,
}

impl<'a, R: ResourceOps> DeletionOrchestrator<'a, R> {
    /// Creates a new deletion orchestrator over the given store
    /// operations.
    #[must_use]
    pub const fn new(ops: &'a R) -> Self {
        Self { ops }
    }

    /// Deletes every resource in `objects`, in reverse of the given
    /// canonical order.
    ///
    /// In dry-run mode each resource is reported as a simulated
    /// `Deleted` change and the store is never contacted. In real mode a
    /// failed delete is logged, counted, and the batch continues; there
    /// are no retries at this layer.
    pub async fn delete_all(
        &self,
        objects: &[ResourceObject],
        opts: &DeleteOptions,
        dry_run: bool,
    ) -> DeletionOutcome {
        let mut changes = ChangeSet::new();

        if dry_run {
            for object in objects.iter().rev() {
                info!("{} {} {}", object, Action::Deleted, DRY_RUN_CLIENT);
                changes.add(Change::new(Action::Deleted, object.id().clone()));
            }
            return DeletionOutcome {
                changes,
                failed: 0,
                attempted: 0,
            };
        }

        info!("deleting {} resource(s)...", objects.len());
        let mut failed = 0;
        for object in objects.iter().rev() {
            match self.ops.delete(object, opts).await {
                Ok(change) => {
                    info!("{change}");
                    changes.add(change);
                }
                Err(e) => {
                    error!("deletion of {object} failed: {e}");
                    failed += 1;
                }
            }
        }

        DeletionOutcome {
            changes,
            failed,
            attempted: objects.len(),
        }
    }
}
