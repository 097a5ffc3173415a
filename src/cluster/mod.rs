//! Cluster API integration module.
//!
//! This module provides the HTTP client for the remote cluster store and
//! the [`ResourceOps`] seam the diff/deletion engine is written against.

mod client;
mod manager;

pub use client::ClusterClient;
pub use manager::{ClusterManager, DeleteOptions, DiffOutcome, ResourceOps};
