//! Dry-run reporting.
//!
//! The reporter renders what a real apply/prune run would do, without
//! mutating the store: one log line per desired resource with its
//! classified action, optional structural diffs for configured
//! resources, and stale objects listed as prospective deletions.

use std::io::Write;

use tracing::{error, info};

use crate::cluster::ResourceOps;
use crate::engine::changeset::{Action, ChangeSet, DRY_RUN_SERVER};
use crate::engine::diff::DiffEngine;
use crate::engine::render::DiffRenderer;
use crate::error::Result;
use crate::resource::{ResourceId, ResourceObject};

/// Outcome of a dry-run report.
#[derive(Debug)]
pub struct DryRunReport {
    /// Classified changes for the desired resources, in canonical order.
    pub changes: ChangeSet,
    /// Stale objects that a real prune would delete. Tracked separately
    /// from the change log: they are reported, never acted upon.
    pub prospective_deletions: Vec<ResourceId>,
    /// Number of resources whose classification failed.
    pub errors: usize,
}

/// Reporter for simulated apply runs.
#[derive(Debug)]
pub struct DryRunReporter<'a, R: ResourceOps> {
    engine: DiffEngine<'a, R>,
    renderer: DiffRenderer,
    with_details: bool,
}

impl<'a, R: ResourceOps> DryRunReporter<'a, R> {
    /// Creates a new reporter over the given store operations.
    #[must_use]
    pub const fn new(ops: &'a R) -> Self {
        Self {
            engine: DiffEngine::new(ops),
            renderer: DiffRenderer::new(),
            with_details: false,
        }
    }

    /// Enables or disables structural diff rendering for configured
    /// resources.
    #[must_use]
    pub const fn with_details(mut self, with_details: bool) -> Self {
        self.with_details = with_details;
        self
    }

    /// Reports the actions a real run would take for `desired`, then
    /// lists `stale` objects as prospective deletions.
    ///
    /// `namespace_exists` is evaluated once by the caller for the whole
    /// run. Classification errors are logged and counted; they never
    /// abort the remaining resources. No store mutation is issued under
    /// any circumstance.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing rendered detail to `out` fails.
    pub async fn report<W: Write>(
        &self,
        desired: &[ResourceObject],
        stale: &[ResourceObject],
        namespace_exists: bool,
        out: &mut W,
    ) -> Result<DryRunReport> {
        let mut changes = ChangeSet::new();
        let mut errors = 0;

        for object in desired {
            match self.engine.diff(object, namespace_exists).await {
                Ok(diff) => {
                    let action = diff.action();
                    if action == Action::ImmutableConflict {
                        error!("{} {} {}", object, action, DRY_RUN_SERVER);
                    } else {
                        info!("{} {} {}", object, action, DRY_RUN_SERVER);
                    }

                    if self.with_details && action == Action::Configured {
                        if let Some((live, merged)) = diff.snapshots() {
                            let rendered = self.renderer.render(live, merged)?;
                            out.write_all(rendered.as_bytes())?;
                        }
                    }

                    changes.add(diff.change);
                }
                Err(e) => {
                    error!("{object}: {e}");
                    errors += 1;
                }
            }
        }

        let mut prospective_deletions = Vec::with_capacity(stale.len());
        for object in stale {
            info!("{} {} {}", object, Action::Deleted, DRY_RUN_SERVER);
            prospective_deletions.push(object.id().clone());
        }

        Ok(DryRunReport {
            changes,
            prospective_deletions,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Call, FakeOps};
    use serde_json::json;

    fn object(name: &str) -> ResourceObject {
        ResourceObject::from_manifest(
            json!({ "kind": "Service", "metadata": { "name": name, "namespace": "apps" } }),
            "apps",
        )
        .expect("valid manifest")
    }

    #[tokio::test]
    async fn test_report_never_mutates_the_store() {
        let ops = FakeOps::new()
            .with_unchanged("Service/apps/one")
            .with_configured("Service/apps/two");
        let reporter = DryRunReporter::new(&ops);
        let desired = [object("one"), object("two")];
        let stale = [object("old")];

        let mut out = Vec::new();
        let report = reporter
            .report(&desired, &stale, true, &mut out)
            .await
            .expect("report succeeds");

        assert!(
            ops.calls()
                .iter()
                .all(|c| matches!(c, Call::Diff(_))),
            "only diff calls may reach the store"
        );
        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.prospective_deletions.len(), 1);
        assert_eq!(report.prospective_deletions[0].name, "old");
    }

    #[tokio::test]
    async fn test_report_matches_real_classification() {
        let ops = FakeOps::new()
            .with_unchanged("Service/apps/one")
            .with_configured("Service/apps/two");
        let reporter = DryRunReporter::new(&ops);
        let desired = [object("one"), object("two"), object("three")];

        let mut out = Vec::new();
        let report = reporter
            .report(&desired, &[], true, &mut out)
            .await
            .expect("report succeeds");

        let actions: Vec<Action> =
            report.changes.entries().iter().map(|c| c.action).collect();
        assert_eq!(
            actions,
            [Action::Unchanged, Action::Configured, Action::Created]
        );
    }

    #[tokio::test]
    async fn test_missing_namespace_reports_all_created() {
        let ops = FakeOps::new();
        let reporter = DryRunReporter::new(&ops);
        let desired = [object("one"), object("two")];

        let mut out = Vec::new();
        let report = reporter
            .report(&desired, &[], false, &mut out)
            .await
            .expect("report succeeds");

        assert!(ops.calls().is_empty());
        assert!(
            report
                .changes
                .entries()
                .iter()
                .all(|c| c.action == Action::Created)
        );
    }

    #[tokio::test]
    async fn test_errors_do_not_abort_remaining_resources() {
        let ops = FakeOps::new()
            .with_failure("Service/apps/one")
            .with_unchanged("Service/apps/two");
        let reporter = DryRunReporter::new(&ops);
        let desired = [object("one"), object("two")];

        let mut out = Vec::new();
        let report = reporter
            .report(&desired, &[], true, &mut out)
            .await
            .expect("report succeeds");

        assert_eq!(report.errors, 1);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes.entries()[0].action, Action::Unchanged);
    }

    #[tokio::test]
    async fn test_details_render_only_for_configured() {
        let ops = FakeOps::new()
            .with_unchanged("Service/apps/one")
            .with_configured("Service/apps/two");
        let reporter = DryRunReporter::new(&ops).with_details(true);
        let desired = [object("one"), object("two")];

        let mut out = Vec::new();
        reporter
            .report(&desired, &[], true, &mut out)
            .await
            .expect("report succeeds");

        let rendered = String::from_utf8(out).expect("utf8 output");
        assert!(rendered.contains("-"), "configured resource should render a diff");

        // A second pass over unchanged-only input emits no detail at all.
        let mut quiet = Vec::new();
        reporter
            .report(&[object("one")], &[], true, &mut quiet)
            .await
            .expect("report succeeds");
        assert!(quiet.is_empty());
    }
}
