//! Operation and config diff display

use colored::Colorize;
use declarative::{DiffSummary, Operation, StateMode};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::ui;

/// Display the operations planned for one resource
pub fn display_operations(resource: &str, mode: StateMode, ops: &[Operation]) {
    if ops.is_empty() {
        println!("  {} {} already {}", "✓".green(), resource.bold(), describe_mode(mode));
        return;
    }

    println!();
    println!("┌─ {} ({mode}) ─────────────────────────────────────────┐", resource.bold());
    println!("│");
    for op in ops {
        println!("│   {} {} {}", ui::method_symbol(op.method()), op.method(), op.path());
        if let Some(value) = op.value() {
            println!("│       {}", compact(value).dimmed());
        }
    }
    println!("│");

    let summary = DiffSummary::from_operations(ops);
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} ({} deletes, {} patches, {} posts)",
        ui::plural(summary.total(), "operation").bold(),
        summary.deletes.to_string().red(),
        summary.patches.to_string().yellow(),
        summary.posts.to_string().green()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn describe_mode(mode: StateMode) -> &'static str {
    match mode {
        StateMode::Merged => "contains the desired config",
        StateMode::Replaced | StateMode::Overridden => "matches the desired config",
        StateMode::Deleted => "has nothing to delete",
    }
}

/// One-line JSON, shortened for display
fn compact(value: &Value) -> String {
    const MAX: usize = 100;
    let text = value.to_string();
    if text.chars().count() <= MAX {
        text
    } else {
        let cut: String = text.chars().take(MAX - 3).collect();
        format!("{cut}...")
    }
}

/// Changed lines between two normalized configs, rendered as YAML
pub fn config_changes(before: &Value, after: &Value) -> Vec<(ChangeTag, String)> {
    let before = serde_yaml::to_string(before).unwrap_or_else(|_| before.to_string());
    let after = serde_yaml::to_string(after).unwrap_or_else(|_| after.to_string());

    TextDiff::from_lines(&before, &after)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .map(|change| (change.tag(), change.to_string_lossy().trim_end().to_string()))
        .collect()
}

/// Print a unified before/after diff; returns whether anything changed
pub fn display_config_diff(before: &Value, after: &Value) -> bool {
    let changes = config_changes(before, after);
    for (tag, line) in &changes {
        match tag {
            ChangeTag::Delete => println!("    {}", format!("- {line}").red()),
            ChangeTag::Insert => println!("    {}", format!("+ {line}").green()),
            ChangeTag::Equal => {}
        }
    }
    !changes.is_empty()
}
