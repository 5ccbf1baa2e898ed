//! `sonicfg diff` - preview the operations a document would send

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use declarative::DiffSummary;

use crate::Context;
use crate::cli::DiffArgs;
use crate::commands::Session;
use crate::config::Config;
use crate::document::Document;
use crate::engine::{display_config_diff, display_operations};
use crate::ui;

pub fn run(ctx: &Context, config: &Config, args: DiffArgs) -> Result<()> {
    let document = Document::load(&args.document)?;
    let tasks = document.validate()?;
    let mut session = Session::open(config, &args.connection)?;

    if !ctx.quiet {
        ui::header(&format!("Diff against {}", session.describe()));
    }

    let mut total = DiffSummary::default();
    for (index, checked) in tasks.iter().enumerate() {
        let planned = declarative::plan(checked.schema, &checked.task.config, checked.mode, &mut session)
            .with_context(|| format!("Task {} ({})", index + 1, checked.schema.name))?;

        for mismatch in &planned.before.mismatches {
            ui::warn(&format!("{}: {mismatch}", checked.schema.name));
        }
        display_operations(checked.schema.name, checked.mode, &planned.operations);

        if args.full && !planned.operations.is_empty() {
            let after = declarative::simulate(checked.schema, &planned.snapshot, &planned.operations)?;
            println!("  {}", "Predicted config:".dimmed());
            display_config_diff(&planned.before.config, &after);
        }

        let summary = DiffSummary::from_operations(&planned.operations);
        total.deletes += summary.deletes;
        total.patches += summary.patches;
        total.posts += summary.posts;
    }

    println!();
    if total.has_changes() {
        ui::info(&format!(
            "{} across {}. Run 'sonicfg apply {}' to send them.",
            ui::plural(total.total(), "operation"),
            ui::plural(tasks.len(), "task"),
            args.document.display()
        ));
    } else {
        ui::success("Device already matches the document");
    }
    Ok(())
}
