//! Request executor - sends operations to a device in order
//!
//! Execution is forward-only: the first failure stops the run and nothing
//! already applied is rolled back. Re-running recomputes the diff against the
//! new device state and converges.

use log::{debug, info};

use crate::context::{ConfirmCallback, Device, ProgressCallback};
use crate::error::{Error, Result};
use crate::types::{ExecuteSummary, Operation};

/// Execute operations with the given callbacks
///
/// # Arguments
/// * `ops` - Operations in execution order
/// * `device` - Open session with the switch
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback, asked once after
///   [`ProgressCallback::on_plan`] and before the first operation
///
/// # Returns
/// Summary of accepted operations. A declined confirmation returns a summary
/// with every operation counted as skipped.
///
/// # Errors
/// [`Error::Transport`] for the first operation that fails or returns a
/// status outside 2xx, carrying the number of operations applied before it.
pub fn execute<D, P, C>(ops: &[Operation], device: &mut D, progress: &mut P, confirm: &mut C) -> Result<ExecuteSummary>
where
    D: Device + ?Sized,
    P: ProgressCallback + ?Sized,
    C: ConfirmCallback + ?Sized,
{
    if ops.is_empty() {
        return Ok(ExecuteSummary::default());
    }

    progress.on_plan(ops);
    let prompt = format!("Apply {} operation{}?", ops.len(), if ops.len() == 1 { "" } else { "s" });
    if !confirm.confirm(&prompt)? {
        info!("Execution declined, {} operations skipped", ops.len());
        return Ok(ExecuteSummary {
            skipped: ops.len(),
            ..Default::default()
        });
    }

    let mut summary = ExecuteSummary::default();
    progress.on_batch_start(ops.len());

    for (index, op) in ops.iter().enumerate() {
        progress.on_operation_start(index, op);
        debug!("{op}");

        let (status, message) = match device.send(op) {
            Ok(status) if (200..300).contains(&status) => {
                progress.on_operation_complete(index, op, status);
                summary.add(op.method());
                continue;
            }
            Ok(status) => (Some(status), format!("unexpected status {status}")),
            Err(e) => (e.status, e.message),
        };

        progress.on_operation_failed(index, op, &message);
        progress.on_batch_complete();
        return Err(Error::Transport {
            method: op.method(),
            path: op.path().clone(),
            status,
            message,
            applied: index,
        });
    }

    progress.on_batch_complete();
    Ok(summary)
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<D: Device + ?Sized>(ops: &[Operation], device: &mut D) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(ops, device, &mut NoProgress, &mut AutoConfirm)
}
