//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying run results
//! to the user: colorized snapshot diffs, run summaries, and the
//! instance status table.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::engine::{Action, ChangeSet};
use crate::instance::Instance;
use crate::resource::ResourceId;

/// Inventory row for the status table.
#[derive(Tabled)]
struct InventoryRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Present")]
    present: String,
}

/// Colorizes a unified diff for terminal display: additions green,
/// removals red, hunk markers dimmed.
#[must_use]
pub fn colorize_diff(diff: &str) -> String {
    let mut output = String::new();
    for line in diff.lines() {
        let colored = if line.starts_with("@@") {
            line.dimmed().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else {
            line.to_string()
        };
        let _ = writeln!(output, "{colored}");
    }
    output
}

/// Formats the per-action summary of a run's change set.
#[must_use]
pub fn format_summary(changes: &ChangeSet, stale: usize) -> String {
    let count = |action| changes.select(action).len();
    let mut output = format!(
        "{} to create, {} to configure, {} unchanged",
        count(Action::Created).to_string().green(),
        count(Action::Configured).to_string().yellow(),
        count(Action::Unchanged),
    );
    let conflicts = count(Action::ImmutableConflict);
    if conflicts > 0 {
        let _ = write!(output, ", {} immutable conflict(s)", conflicts.to_string().red());
    }
    if stale > 0 {
        let _ = write!(output, ", {} stale to delete", stale.to_string().red());
    }
    output
}

/// Formats the instance record and live presence of its resources.
#[must_use]
pub fn format_status(instance: &Instance, presence: &[(ResourceId, bool)]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Instance: {}/{}", instance.namespace, instance.name);
    let _ = writeln!(output, "Digest:   {}", instance.short_digest());
    let _ = writeln!(
        output,
        "Applied:  {}",
        instance.last_applied.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let rows: Vec<InventoryRow> = presence
        .iter()
        .map(|(id, present)| InventoryRow {
            kind: id.kind.clone(),
            namespace: id.namespace.clone(),
            name: id.name.clone(),
            present: if *present {
                "yes".green().to_string()
            } else {
                "no".red().to_string()
            },
        })
        .collect();

    if !rows.is_empty() {
        output.push('\n');
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Change;

    #[test]
    fn test_summary_counts() {
        colored::control::set_override(false);
        let mut changes = ChangeSet::new();
        changes.add(Change::new(Action::Created, ResourceId::new("Service", "apps", "a")));
        changes.add(Change::new(Action::Created, ResourceId::new("Service", "apps", "b")));
        changes.add(Change::new(Action::Unchanged, ResourceId::new("Service", "apps", "c")));

        let summary = format_summary(&changes, 1);
        assert_eq!(summary, "2 to create, 0 to configure, 1 unchanged, 1 stale to delete");
    }

    #[test]
    fn test_colorize_diff_keeps_line_count() {
        let diff = "--- live\n+++ merged\n@@ -1 +1 @@\n-  port: 8080\n+  port: 9090\n";
        let colorized = colorize_diff(diff);
        assert_eq!(colorized.lines().count(), diff.lines().count());
    }

    #[test]
    fn test_status_table_lists_inventory() {
        colored::control::set_override(false);
        let instance = Instance::new("podinfo", "apps", &[]);
        let presence = vec![(ResourceId::new("Service", "apps", "gateway"), true)];

        let status = format_status(&instance, &presence);
        assert!(status.contains("Instance: apps/podinfo"));
        assert!(status.contains("gateway"));
        assert!(status.contains("yes"));
    }
}
