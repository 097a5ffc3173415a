// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are flagged
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Additional strictness - Leave little unchecked
#![warn(missing_docs)]                // All public items should be documented
#![warn(dead_code)]                   // Unused code is flagged
#![warn(unused_imports)]              // Unused imports are flagged
#![warn(unused_variables)]            // Unused variables are flagged
#![warn(unused_must_use)]             // Handle Result and Option explicitly

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # veld
//!
//! A declarative instance lifecycle manager for remote cluster resources.
//!
//! ## Overview
//!
//! veld manages named **instances**: versioned, ordered collections of
//! declaratively-described resources applied to a remote cluster-like
//! store. It provides:
//!
//! - Server-side dry-run diffs that classify each resource as created,
//!   configured, unchanged, or blocked by an immutable-field conflict
//! - Ordered teardown: resources are deleted in the exact reverse of
//!   their apply order, with per-resource failure aggregation
//! - Termination waiting: confirmed absence of deleted resources
//! - Dry-run reporting that never mutates the store
//!
//! ## Architecture
//!
//! A run walks an instance's resource list in its canonical order:
//!
//! 1. **Desired state**: loaded from manifests or the instance inventory
//! 2. **Live state**: read fresh from the cluster on every call
//! 3. **Engine**: classifies actions, orchestrates deletion, waits for
//!    finalization
//!
//! ## Modules
//!
//! - [`resource`]: dynamic resource representation and manifest loading
//! - [`instance`]: instance records and their storage
//! - [`cluster`]: cluster API client and the [`cluster::ResourceOps`] seam
//! - [`engine`]: diff classification, dry-run reporting, ordered
//!   deletion, termination waiting, diff rendering
//! - [`cli`]: command-line interface
//!
//! ## Example
//!
//! ```bash
//! # Report what deleting the instance would do
//! veld -n apps delete podinfo --dry-run
//!
//! # Uninstall it and wait for finalization
//! veld -n apps delete podinfo
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod cluster;
pub mod engine;
pub mod error;
pub mod instance;
pub mod resource;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands};
pub use cluster::{ClusterClient, ClusterManager, DeleteOptions, ResourceOps};
pub use engine::{
    Action, Change, ChangeSet, DeletionOrchestrator, DiffEngine, DiffRenderer, DryRunReporter,
    TerminationWaiter, WaitOptions,
};
pub use error::{Result, VeldError};
pub use instance::{ClusterInstanceStore, Instance, InstanceStore};
pub use resource::{ResourceId, ResourceObject};
