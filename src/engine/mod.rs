//! Reconciliation diff & ordered deletion engine.
//!
//! This module holds the core run logic: action classification against
//! live state, dry-run reporting, reverse-order deletion with failure
//! aggregation, termination waiting, and snapshot diff rendering.

mod changeset;
mod delete;
mod diff;
mod render;
mod report;
mod wait;

pub use changeset::{Action, Change, ChangeSet, DRY_RUN_CLIENT, DRY_RUN_SERVER};
pub use delete::{DeletionOrchestrator, DeletionOutcome};
pub use diff::{DiffEngine, ResourceDiff};
pub use render::DiffRenderer;
pub use report::{DryRunReport, DryRunReporter};
pub use wait::{TerminationWaiter, WaitOptions};
