//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// veld - declarative instance lifecycle manager.
#[derive(Parser, Debug)]
#[command(name = "veld")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Cluster API server URL.
    #[arg(long, global = true, env = "VELD_SERVER")]
    pub server: Option<String>,

    /// Bearer token for the cluster API.
    #[arg(long, global = true, env = "VELD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Namespace of the instance.
    #[arg(short = 'n', long, global = true, default_value = "default")]
    pub namespace: String,

    /// Overall run deadline in seconds.
    #[arg(long, global = true, default_value_t = 300)]
    pub timeout: u64,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Uninstall an instance and its resources from the cluster.
    #[command(visible_alias = "uninstall")]
    Delete {
        /// Instance name.
        name: String,

        /// Report the deletions without mutating the cluster.
        #[arg(long)]
        dry_run: bool,

        /// Wait for the deleted resources to be finalized.
        #[arg(
            long,
            default_value_t = true,
            action = ArgAction::Set,
            num_args = 0..=1,
            default_missing_value = "true"
        )]
        wait: bool,
    },

    /// Show what applying the given manifests would change, without
    /// mutating the cluster.
    Diff {
        /// Instance name.
        name: String,

        /// Path to the multi-document manifest file.
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Render structural diffs for configured resources.
        #[arg(long)]
        details: bool,
    },

    /// Show the instance record and the live presence of its resources.
    Status {
        /// Instance name.
        name: String,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
