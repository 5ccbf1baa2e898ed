//! `sonicfg apply` - make the device match a document
//!
//! Every task is validated before the device is contacted. Tasks then run in
//! document order and the first failure stops the run; operations already
//! sent stay applied, and running again converges.

use std::fs;
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};
use chrono::{DateTime, Utc};
use declarative::{ExecuteSummary, RunOptions, RunReport};
use serde::Serialize;

use crate::Context;
use crate::cli::ApplyArgs;
use crate::commands::Session;
use crate::config::Config;
use crate::document::{Checked, Document, Format};
use crate::engine::{BarProgress, PromptConfirm, display_config_diff, display_operations, print_summary};
use crate::ui;

/// What an apply run did, written with `--report`
#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub generated_at: DateTime<Utc>,
    pub device: String,
    pub check_mode: bool,
    pub changed: bool,
    pub results: Vec<RunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplyReport {
    fn new(device: String, check_mode: bool) -> Self {
        Self {
            generated_at: Utc::now(),
            device,
            check_mode,
            changed: false,
            results: Vec::new(),
            error: None,
        }
    }

    fn push(&mut self, report: RunReport) {
        self.changed |= report.changed;
        self.results.push(report);
    }

    /// Write in the format given by the file extension
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = match Format::from_path(path)? {
            Format::Yaml => serde_yaml::to_string(self)?,
            Format::Json => serde_json::to_string_pretty(self)? + "\n",
            Format::Toml => toml::to_string_pretty(self)?,
        };
        fs::write(path, content).with_context(|| format!("Could not write report {}", path.display()))
    }
}

pub fn run(ctx: &Context, config: &Config, args: ApplyArgs) -> Result<()> {
    let document = Document::load(&args.document)?;
    let tasks = document.validate()?;
    let mut session = Session::open(config, &args.connection)?;
    apply(ctx, &args, &tasks, &mut session)
}

/// Run validated tasks in order against an open session
fn apply(ctx: &Context, args: &ApplyArgs, tasks: &[Checked<'_>], session: &mut Session) -> Result<()> {
    if !ctx.quiet {
        let action = if args.check { "Checking" } else { "Applying" };
        ui::header(&format!("{action} {} on {}", ui::plural(tasks.len(), "task"), session.describe()));
    }

    let opts = RunOptions {
        check_mode: args.check,
    };
    let mut report = ApplyReport::new(session.describe(), args.check);
    let mut summary = ExecuteSummary::default();
    let mut failure = None;
    let mut applied_before_failure = 0;

    for (index, checked) in tasks.iter().enumerate() {
        let mut progress = BarProgress::new(checked.schema.name, checked.mode);
        let mut confirm = PromptConfirm { yes: args.yes };
        let result = declarative::run(
            checked.schema,
            &checked.task.config,
            checked.mode,
            session,
            opts,
            &mut progress,
            &mut confirm,
        );

        let run = match result {
            Ok(run) => run,
            Err(e) => {
                applied_before_failure = summary.total_changes() + e.applied();
                let task = format!("Task {} ({}) failed", index + 1, checked.schema.name);
                let e = anyhow::Error::new(e).context(task);
                report.error = Some(format!("{e:#}"));
                failure = Some(e);
                break;
            }
        };

        for warning in &run.warnings {
            ui::warn(&format!("{}: {warning}", run.resource));
        }
        if args.check {
            show_check(&run);
        } else {
            tally(&mut summary, &run);
            if ctx.verbose > 0
                && let Some(after) = &run.after
            {
                display_config_diff(&run.before, after);
            }
        }
        report.push(run);
    }

    if let Some(path) = &args.report {
        report.write(path)?;
        ui::dim(&format!("Report written to {}", path.display()));
    }

    if let Some(e) = failure {
        if applied_before_failure > 0 {
            ui::warn(&format!(
                "{} were applied before the failure",
                ui::plural(applied_before_failure, "operation")
            ));
            save(session, args.save)?;
        }
        return Err(e);
    }

    if args.check {
        println!();
        ui::info("Check mode - nothing was sent to the device");
        return Ok(());
    }

    save(session, args.save)?;

    if report.changed || summary.skipped > 0 {
        print_summary(&summary);
    } else {
        println!();
        ui::success("Device already matches the document");
    }
    Ok(())
}

/// Write the offline snapshot when `--save` was given
fn save(session: &Session, requested: bool) -> Result<()> {
    if requested && let Some(path) = session.save()? {
        ui::dim(&format!("Snapshot saved to {}", path.display()));
    }
    Ok(())
}

/// In check mode the executor never runs, so show the plan here
fn show_check(run: &RunReport) {
    display_operations(&run.resource, run.state, &run.commands);
    if let Some(after) = &run.after_generated {
        display_config_diff(&run.before, after);
    }
}

/// Count what a task sent, or skipped when the prompt was declined
fn tally(summary: &mut ExecuteSummary, run: &RunReport) {
    if run.changed {
        for op in &run.commands {
            summary.add(op.method());
        }
    } else {
        summary.skipped += run.commands.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ApplyArgs, ConnectionArgs};
    use declarative::{MemoryDevice, StateMode};
    use serde_json::{Value, json};

    fn apply_args(dir: &Path, document: &str, check: bool) -> ApplyArgs {
        let doc_path = dir.join("site.yaml");
        fs::write(&doc_path, document).unwrap();
        ApplyArgs {
            document: doc_path,
            check,
            yes: true,
            report: Some(dir.join("report.json")),
            save: true,
            connection: ConnectionArgs {
                offline: Some(dir.join("snap.json")),
                ..ConnectionArgs::default()
            },
        }
    }

    fn ctx() -> Context {
        Context { verbose: 0, quiet: true }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    const DOCUMENT: &str = "
tasks:
  - resource: qos_pfc
    config:
      poll_interval: 150
  - resource: ssh
    state: merged
    config:
      client:
        cipher: aes256-ctr
";

    #[test]
    fn test_apply_offline_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let args = apply_args(dir.path(), DOCUMENT, false);
        run(&ctx(), &Config::default(), args).unwrap();

        let snapshot = read_json(&dir.path().join("snap.json"));
        assert_eq!(snapshot["qos"]["pfc-watchdog"]["poll"]["config"]["poll-interval"], json!(150));

        let report = read_json(&dir.path().join("report.json"));
        assert_eq!(report["changed"], json!(true));
        assert_eq!(report["results"].as_array().unwrap().len(), 2);
        assert_eq!(report["results"][0]["after"]["poll_interval"], json!(150));

        // Second run converges
        let args = apply_args(dir.path(), DOCUMENT, false);
        run(&ctx(), &Config::default(), args).unwrap();
        let report = read_json(&dir.path().join("report.json"));
        assert_eq!(report["changed"], json!(false));
        assert!(report["results"][0]["commands"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_check_mode_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let args = apply_args(dir.path(), DOCUMENT, true);
        run(&ctx(), &Config::default(), args).unwrap();

        assert!(!dir.path().join("snap.json").exists());
        let report = read_json(&dir.path().join("report.json"));
        assert_eq!(report["check_mode"], json!(true));
        assert_eq!(report["results"][0]["after(generated)"]["poll_interval"], json!(150));
    }

    #[test]
    fn test_invalid_task_stops_before_contact() {
        let dir = tempfile::tempdir().unwrap();
        let document = "
- resource: qos_pfc
  config:
    poll_interval: 150
- resource: qos_pfc
  config:
    poll_interval: fast
";
        let args = apply_args(dir.path(), document, false);
        let err = run(&ctx(), &Config::default(), args).unwrap_err();
        assert!(format!("{err:#}").contains("Task 2"));
        assert!(!dir.path().join("report.json").exists());
        assert!(!dir.path().join("snap.json").exists());
    }

    #[test]
    fn test_failure_keeps_applied_operations() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = apply_args(dir.path(), DOCUMENT, false);
        args.report = None;
        let document = Document::parse(
            "- resource: qos_pfc\n  config:\n    counter_poll: false\n    poll_interval: 150\n",
            Format::Yaml,
        )
        .unwrap();
        let tasks = document.validate().unwrap();
        let path = dir.path().join("snap.json");
        let mut session = Session::Offline {
            device: MemoryDevice::new().fail_on(1, 500),
            path: path.clone(),
        };

        let err = apply(&ctx(), &args, &tasks, &mut session).unwrap_err();
        assert!(format!("{err:#}").contains("Task 1 (qos_pfc) failed"));
        assert_eq!(err.downcast_ref::<declarative::Error>().map(declarative::Error::applied), Some(1));

        // the change sent before the failure is in the saved snapshot
        let snapshot = read_json(&path);
        assert_eq!(snapshot["qos"]["pfc-watchdog"]["flex"]["config"]["counter-poll"], json!(false));
        assert!(snapshot["qos"]["pfc-watchdog"].get("poll").is_none());
    }

    #[test]
    fn test_tally() {
        let op = declarative::Operation::delete(declarative::Path::parse("data/openconfig-qos:qos/pfc-watchdog").unwrap());
        let mut run = RunReport::new("qos_pfc", StateMode::Deleted, json!({}));
        run.commands = vec![op];

        let mut summary = ExecuteSummary::default();
        tally(&mut summary, &run);
        assert_eq!(summary.skipped, 1);

        run.changed = true;
        tally(&mut summary, &run);
        assert_eq!(summary.deleted, 1);
    }

    #[test]
    fn test_report_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = ApplyReport::new("leaf1".to_string(), false);
        let mut device = MemoryDevice::new();
        let run = declarative::run_simple(
            &crate::resources::qos_pfc::SCHEMA,
            &json!({"poll_interval": 150}),
            StateMode::Merged,
            &mut device,
            RunOptions::default(),
        )
        .unwrap();
        report.push(run);

        let yaml = dir.path().join("report.yaml");
        report.write(&yaml).unwrap();
        assert!(fs::read_to_string(&yaml).unwrap().contains("changed: true"));
        assert!(report.write(&dir.path().join("report.txt")).is_err());
    }
}
