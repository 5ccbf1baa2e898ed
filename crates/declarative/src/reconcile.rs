//! End-to-end reconciliation of one resource
//!
//! validate → fetch → normalize → diff → execute (or simulate in check mode)

use log::{debug, info, warn};
use serde_json::Value;

use crate::context::{ConfirmCallback, Device, ProgressCallback};
use crate::diff::diff;
use crate::error::Result;
use crate::executor::{execute, execute_simple};
use crate::facts::{Snapshot, fetch};
use crate::memory::MemoryDevice;
use crate::normalize::{Facts, normalize};
use crate::schema::ResourceSchema;
use crate::types::{Operation, RunReport, StateMode};
use crate::validate::validate;

/// Options for a reconciliation run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute and simulate operations without sending them
    pub check_mode: bool,
}

/// Operations computed for a desired config, with the state they start from
#[derive(Debug, Clone)]
pub struct Planned {
    pub snapshot: Snapshot,
    pub before: Facts,
    /// Desired config in canonical form
    pub want: Value,
    pub operations: Vec<Operation>,
}

/// Fetch and normalize the current config of a resource
pub fn facts<D: Device + ?Sized>(schema: &ResourceSchema, device: &mut D) -> Result<Facts> {
    let snapshot = fetch(schema, device)?;
    normalize(schema, &snapshot)
}

/// Validate `config` and compute the operations `mode` requires
///
/// The config is validated before the device is contacted.
pub fn plan<D: Device + ?Sized>(
    schema: &ResourceSchema,
    config: &Value,
    mode: StateMode,
    device: &mut D,
) -> Result<Planned> {
    let want = validate(schema, config)?;
    let snapshot = fetch(schema, device)?;
    let before = normalize(schema, &snapshot)?;
    let operations = diff(schema, &want, &before.config, mode)?;
    debug!("{} {mode}: {} operations", schema.name, operations.len());

    Ok(Planned {
        snapshot,
        before,
        want,
        operations,
    })
}

/// Apply `ops` to an in-memory copy of `snapshot` and normalize the result
pub fn simulate(schema: &ResourceSchema, snapshot: &Snapshot, ops: &[Operation]) -> Result<Value> {
    let mut device = MemoryDevice::from_snapshot(snapshot);
    execute_simple(ops, &mut device)?;
    Ok(normalize(schema, &device.snapshot())?.config)
}

/// Reconcile one resource and report what happened
pub fn run<D, P, C>(
    schema: &ResourceSchema,
    config: &Value,
    mode: StateMode,
    device: &mut D,
    opts: RunOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<RunReport>
where
    D: Device + ?Sized,
    P: ProgressCallback + ?Sized,
    C: ConfirmCallback + ?Sized,
{
    let planned = plan(schema, config, mode, device)?;
    let mut report = RunReport::new(schema.name, mode, planned.before.config.clone());
    report.warnings = planned
        .before
        .mismatches
        .iter()
        .map(ToString::to_string)
        .collect();

    if planned.operations.is_empty() {
        info!("{}: already in {mode} state", schema.name);
        return Ok(report);
    }

    report.commands.clone_from(&planned.operations);

    if opts.check_mode {
        report.after_generated = Some(simulate(schema, &planned.snapshot, &planned.operations)?);
        report.changed = true;
        return Ok(report);
    }

    let summary = execute(&planned.operations, device, progress, confirm)?;
    if summary.skipped > 0 {
        warn!("{}: {} operations not applied", schema.name, summary.skipped);
        report
            .warnings
            .push(format!("{} operations not applied", summary.skipped));
        return Ok(report);
    }

    info!("{}: applied {} operations", schema.name, summary.total_changes());
    report.changed = true;
    report.after = Some(facts(schema, device)?.config);
    Ok(report)
}

/// Reconcile without progress reporting or confirmation
pub fn run_simple<D: Device + ?Sized>(
    schema: &ResourceSchema,
    config: &Value,
    mode: StateMode,
    device: &mut D,
    opts: RunOptions,
) -> Result<RunReport> {
    use crate::context::{AutoConfirm, NoProgress};

    run(schema, config, mode, device, opts, &mut NoProgress, &mut AutoConfirm)
}
