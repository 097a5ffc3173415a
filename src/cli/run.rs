//! Command implementations.
//!
//! The command bodies are generic over the store seams so the gating
//! rules (instance-record deletion only after an error-free batch,
//! waiting only after record deletion) are enforced and tested here,
//! not in the binary.

use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;

use tracing::info;

use crate::cluster::{DeleteOptions, ResourceOps};
use crate::engine::{
    Action, DeletionOrchestrator, DryRunReport, DryRunReporter, TerminationWaiter, WaitOptions,
};
use crate::error::{EngineError, Result};
use crate::instance::InstanceStore;
use crate::resource::{ResourceId, ResourceObject};

/// Options for the delete command.
#[derive(Debug, Clone, Copy)]
pub struct DeleteCommand {
    /// Simulate the deletions without mutating the cluster.
    pub dry_run: bool,
    /// Wait for the deleted resources to be finalized.
    pub wait: bool,
    /// Deadline for the termination wait.
    pub wait_timeout: Duration,
}

/// Uninstalls an instance: deletes its resources in reverse apply order,
/// then its record, then optionally waits for finalization.
///
/// The instance record is deleted only after every per-resource delete
/// attempt has been issued and none failed; a partial failure keeps the
/// record so a retry can still discover the remaining resources.
///
/// # Errors
///
/// Returns [`EngineError::DeletionIncomplete`] if any per-resource
/// deletion failed, and [`EngineError::TerminationTimeout`] if waiting
/// was requested and resources were still present at the deadline.
pub async fn delete_instance<R, S>(
    ops: &R,
    store: &S,
    name: &str,
    namespace: &str,
    cmd: DeleteCommand,
) -> Result<()>
where
    R: ResourceOps,
    S: InstanceStore,
{
    let instance = store.get(name, namespace).await?;
    let objects = instance.list_objects();

    let orchestrator = DeletionOrchestrator::new(ops);
    let opts = DeleteOptions::for_instance(&instance.name, &instance.namespace);

    let outcome = orchestrator.delete_all(&objects, &opts, cmd.dry_run).await;
    if cmd.dry_run {
        return Ok(());
    }

    if outcome.had_errors() {
        return Err(EngineError::DeletionIncomplete {
            failed: outcome.failed,
            total: outcome.attempted,
        }
        .into());
    }

    store.delete(&instance.name, &instance.namespace).await?;

    let deleted = outcome.changes.subjects_of(Action::Deleted);
    if cmd.wait && !deleted.is_empty() {
        info!("waiting for {} resource(s) to be finalized...", deleted.len());
        let waiter = TerminationWaiter::new(ops);
        waiter
            .wait(&deleted, &WaitOptions::with_timeout(cmd.wait_timeout))
            .await?;
        info!("all resources have been deleted");
    }

    Ok(())
}

/// Reports what applying `desired` would change for the instance,
/// writing rendered detail diffs to `out`.
///
/// Stale resources are the instance inventory entries absent from the
/// desired set; they are reported as prospective deletions and never
/// touched. The namespace-existence check runs once for the whole run.
///
/// # Errors
///
/// Returns an error if the instance is missing or writing detail output
/// fails. Per-resource classification errors are logged and counted in
/// the report instead.
pub async fn diff_instance<R, S, W>(
    ops: &R,
    store: &S,
    name: &str,
    namespace: &str,
    desired: &[ResourceObject],
    details: bool,
    out: &mut W,
) -> Result<DryRunReport>
where
    R: ResourceOps,
    S: InstanceStore,
    W: Write,
{
    let instance = store.get(name, namespace).await?;

    let desired_ids: HashSet<&ResourceId> = desired.iter().map(ResourceObject::id).collect();
    let stale: Vec<ResourceObject> = instance
        .list_objects()
        .into_iter()
        .filter(|o| !desired_ids.contains(o.id()))
        .collect();

    let namespace_exists = ops.namespace_exists(namespace).await?;

    let reporter = DryRunReporter::new(ops).with_details(details);
    reporter.report(desired, &stale, namespace_exists, out).await
}

/// Fetches the instance and the live presence of each inventory entry.
///
/// # Errors
///
/// Returns an error if the instance is missing or a presence check
/// fails.
pub async fn instance_presence<R, S>(
    ops: &R,
    store: &S,
    name: &str,
    namespace: &str,
) -> Result<(crate::instance::Instance, Vec<(ResourceId, bool)>)>
where
    R: ResourceOps,
    S: InstanceStore,
{
    let instance = store.get(name, namespace).await?;

    let mut presence = Vec::with_capacity(instance.inventory.len());
    for object in instance.list_objects() {
        let present = ops.exists(object.id()).await?;
        presence.push((object.id().clone(), present));
    }

    Ok((instance, presence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Call, FakeOps};
    use crate::error::{InstanceError, VeldError};
    use crate::instance::Instance;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Instance store fake that serves one record and counts deletions.
    struct FakeStore {
        instance: Option<Instance>,
        deletes: Mutex<usize>,
    }

    impl FakeStore {
        fn with_instance(instance: Instance) -> Self {
            Self {
                instance: Some(instance),
                deletes: Mutex::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                instance: None,
                deletes: Mutex::new(0),
            }
        }

        fn delete_count(&self) -> usize {
            *self.deletes.lock().expect("delete counter lock")
        }
    }

    #[async_trait]
    impl InstanceStore for FakeStore {
        async fn get(&self, name: &str, namespace: &str) -> Result<Instance> {
            self.instance.clone().ok_or_else(|| {
                InstanceError::NotFound {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                }
                .into()
            })
        }

        async fn delete(&self, _name: &str, _namespace: &str) -> Result<()> {
            *self.deletes.lock().expect("delete counter lock") += 1;
            Ok(())
        }
    }

    fn instance() -> Instance {
        let objects: Vec<ResourceObject> = ["first", "second", "third"]
            .into_iter()
            .map(|name| ResourceObject::from_id(ResourceId::new("Service", "apps", name)))
            .collect();
        Instance::new("podinfo", "apps", &objects)
    }

    fn delete_cmd(dry_run: bool, wait: bool) -> DeleteCommand {
        DeleteCommand {
            dry_run,
            wait,
            wait_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_all_success_deletes_record_once_then_waits() {
        let ops = FakeOps::new();
        let store = FakeStore::with_instance(instance());

        delete_instance(&ops, &store, "podinfo", "apps", delete_cmd(false, true))
            .await
            .expect("delete succeeds");

        assert_eq!(store.delete_count(), 1);
        // The wait phase polled the deleted resources.
        let polls = ops
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Exists(_)))
            .count();
        assert_eq!(polls, 3);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_record_and_skips_wait() {
        let ops = FakeOps::new().with_failure("Service/apps/second");
        let store = FakeStore::with_instance(instance());

        let err = delete_instance(&ops, &store, "podinfo", "apps", delete_cmd(false, true))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VeldError::Engine(EngineError::DeletionIncomplete { failed: 1, total: 3 })
        ));
        assert_eq!(store.delete_count(), 0);
        assert!(
            !ops.calls().iter().any(|c| matches!(c, Call::Exists(_))),
            "termination wait must be skipped after a failed batch"
        );
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let ops = FakeOps::new();
        let store = FakeStore::with_instance(instance());

        delete_instance(&ops, &store, "podinfo", "apps", delete_cmd(true, true))
            .await
            .expect("dry run succeeds");

        assert!(ops.calls().is_empty());
        assert_eq!(store.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_wait_disabled_skips_polling() {
        let ops = FakeOps::new();
        let store = FakeStore::with_instance(instance());

        delete_instance(&ops, &store, "podinfo", "apps", delete_cmd(false, false))
            .await
            .expect("delete succeeds");

        assert_eq!(store.delete_count(), 1);
        assert!(!ops.calls().iter().any(|c| matches!(c, Call::Exists(_))));
    }

    #[tokio::test]
    async fn test_missing_instance_fails_before_any_mutation() {
        let ops = FakeOps::new();
        let store = FakeStore::empty();

        let err = delete_instance(&ops, &store, "podinfo", "apps", delete_cmd(false, true))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            VeldError::Instance(InstanceError::NotFound { .. })
        ));
        assert!(ops.calls().is_empty());
    }

    #[tokio::test]
    async fn test_diff_reports_stale_inventory_entries() {
        let ops = FakeOps::new().with_unchanged("Service/apps/first");
        let store = FakeStore::with_instance(instance());
        // Desired keeps only "first"; "second" and "third" become stale.
        let desired = [ResourceObject::from_id(ResourceId::new(
            "Service", "apps", "first",
        ))];

        let mut out = Vec::new();
        let report = diff_instance(&ops, &store, "podinfo", "apps", &desired, false, &mut out)
            .await
            .expect("diff succeeds");

        assert_eq!(report.changes.len(), 1);
        let stale_names: Vec<&str> = report
            .prospective_deletions
            .iter()
            .map(|id| id.name.as_str())
            .collect();
        assert_eq!(stale_names, ["second", "third"]);
        assert_eq!(store.delete_count(), 0);
        assert!(
            !ops.calls()
                .iter()
                .any(|c| matches!(c, Call::Delete(_) | Call::Exists(_)))
        );
    }

    #[tokio::test]
    async fn test_presence_lists_every_inventory_entry() {
        let ops = FakeOps::new().with_always_present("Service/apps/second");
        let store = FakeStore::with_instance(instance());

        let (inst, presence) = instance_presence(&ops, &store, "podinfo", "apps")
            .await
            .expect("status succeeds");

        assert_eq!(inst.name, "podinfo");
        assert_eq!(presence.len(), 3);
        assert!(!presence[0].1);
        assert!(presence[1].1);
    }
}
