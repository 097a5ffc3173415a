//! CLI module for the veld instance lifecycle tool.
//!
//! This module provides the command-line surface for deleting, diffing,
//! and inspecting instances.

mod commands;
pub mod output;
mod run;

pub use commands::{Cli, Commands};
pub use run::{DeleteCommand, delete_instance, diff_instance, instance_presence};
