//! Structural diff rendering for snapshot pairs.
//!
//! Snapshots arrive as structured documents, are serialized to canonical
//! YAML, and rendered as a unified line diff. Map keys serialize sorted,
//! so key-ordering-only differences never show up; sequence order is
//! preserved and does render as a change.

use serde_json::Value;
use similar::TextDiff;

use crate::error::EngineError;

/// Default number of context lines around each hunk.
const DEFAULT_CONTEXT_LINES: usize = 4;

/// Renderer producing human-readable diffs of two resource snapshots.
#[derive(Debug, Clone, Copy)]
pub struct DiffRenderer {
    context_lines: usize,
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffRenderer {
    /// Creates a renderer with the default context width.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Renders the structural difference between a live snapshot and a
    /// merged-desired snapshot. Identical snapshots render to an empty
    /// string.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be serialized.
    pub fn render(&self, live: &Value, merged: &Value) -> Result<String, EngineError> {
        let live_yaml = to_canonical_yaml(live)?;
        let merged_yaml = to_canonical_yaml(merged)?;

        if live_yaml == merged_yaml {
            return Ok(String::new());
        }

        let diff = TextDiff::from_lines(&live_yaml, &merged_yaml);
        let mut unified = diff.unified_diff();
        unified.context_radius(self.context_lines).header("live", "merged");
        Ok(unified.to_string())
    }
}

fn to_canonical_yaml(snapshot: &Value) -> Result<String, EngineError> {
    serde_yaml::to_string(snapshot).map_err(|e| EngineError::RenderFailed {
        message: e.to_string(),
    })
}
