//! Progress and confirmation for the declarative executor

use colored::Colorize;
use declarative::{ConfirmCallback, ExecuteSummary, Operation, ProgressCallback, StateMode};
use indicatif::ProgressBar;

use crate::progress;

use super::differ::display_operations;

/// Shows the planned operations, then a bar while they are sent
pub struct BarProgress {
    resource: String,
    mode: StateMode,
    bar: Option<ProgressBar>,
    /// Messages of failed operations, printed once the bar is cleared
    failures: Vec<String>,
}

impl BarProgress {
    pub fn new(resource: &str, mode: StateMode) -> Self {
        Self {
            resource: resource.to_string(),
            mode,
            bar: None,
            failures: Vec::new(),
        }
    }
}

impl ProgressCallback for BarProgress {
    fn on_plan(&mut self, ops: &[Operation]) {
        display_operations(&self.resource, self.mode, ops);
    }

    fn on_batch_start(&mut self, count: usize) {
        self.bar = Some(progress::bar(count as u64, "Applying"));
    }

    fn on_operation_start(&mut self, _index: usize, op: &Operation) {
        if let Some(bar) = &self.bar {
            bar.set_message(op.to_string());
        }
    }

    fn on_operation_complete(&mut self, _index: usize, _op: &Operation, _status: u16) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_operation_failed(&mut self, index: usize, op: &Operation, message: &str) {
        self.failures.push(format!("#{} {op}: {message}", index + 1));
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        for failure in self.failures.drain(..) {
            println!("  {} {failure}", "✗".red());
        }
    }
}

/// Asks on the terminal unless `yes` was given
pub struct PromptConfirm {
    pub yes: bool,
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> declarative::Result<bool> {
        if self.yes {
            return Ok(true);
        }

        println!();
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(|e| declarative::Error::Interrupted(format!("Confirmation failed: {e}")))?;

        if !confirmed {
            println!("  {} Aborted", "✗".red());
        }
        Ok(confirmed)
    }
}

/// Print the totals of a run across all tasks
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.skipped == 0 {
        println!("  {} Configuration applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Configuration partly applied", "⚠".yellow().bold());
    }

    if summary.patched > 0 {
        println!("    • {} patched", summary.patched);
    }
    if summary.posted > 0 {
        println!("    • {} created", summary.posted);
    }
    if summary.deleted > 0 {
        println!("    • {} deleted", summary.deleted);
    }
    if summary.skipped > 0 {
        println!("    • {} {}", summary.skipped, "skipped".yellow());
    }
}
