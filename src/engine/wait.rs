//! Post-deletion finalization confirmation.
//!
//! Deletion on the remote store may be asynchronous. The waiter polls
//! until every deleted resource is confirmed absent or the timeout
//! elapses.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cluster::ResourceOps;
use crate::error::{EngineError, Result};
use crate::resource::ResourceId;

/// Options for termination waiting.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Overall wait deadline.
    pub timeout: Duration,
    /// Delay between polling rounds.
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(2),
        }
    }
}

impl WaitOptions {
    /// Returns the default options with the given overall timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Waiter that blocks until deleted resources are finalized.
#[derive(Debug)]
pub struct TerminationWaiter<'a, R: ResourceOps> {
    ops: &'a R,
}

impl<'a, R: ResourceOps> TerminationWaiter<'a, R> {
    /// Creates a new waiter over the given store operations.
    #[must_use]
    pub const fn new(ops: &'a R) -> Self {
        Self { ops }
    }

    /// Polls the store until every subject is confirmed absent.
    ///
    /// A poll error keeps the subject pending; only a confirmed absence
    /// removes it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TerminationTimeout`] naming the subjects
    /// still present when the deadline elapses.
    pub async fn wait(&self, subjects: &[ResourceId], opts: &WaitOptions) -> Result<()> {
        if subjects.is_empty() {
            return Ok(());
        }

        let deadline = Instant::now() + opts.timeout;
        let mut pending: Vec<ResourceId> = subjects.to_vec();

        loop {
            let mut still_present = Vec::new();
            for id in &pending {
                match self.ops.exists(id).await {
                    Ok(false) => debug!("{id} is finalized"),
                    Ok(true) => still_present.push(id.clone()),
                    Err(e) => {
                        debug!("termination poll for {id} failed: {e}");
                        still_present.push(id.clone());
                    }
                }
            }

            if still_present.is_empty() {
                return Ok(());
            }
            pending = still_present;

            let now = Instant::now();
            if now >= deadline {
                return Err(EngineError::TerminationTimeout {
                    pending: pending.iter().map(ToString::to_string).collect(),
                    timeout_secs: opts.timeout.as_secs(),
                }
                .into());
            }
            tokio::time::sleep(opts.interval.min(deadline - now)).await;
        }
    }
}
