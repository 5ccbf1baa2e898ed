//! Device session and provider traits
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific transport, progress display or prompt.

use serde_json::Value;
use yangpath::Path;

use crate::error::Result;
use crate::types::Operation;

/// Failure reported by a [`Device`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    /// HTTP status, when the device answered
    pub status: Option<u16>,
    pub message: String,
}

impl DeviceError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A transport-level failure with no HTTP status
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DeviceError {}

/// An open management session with one switch
///
/// The session is passed explicitly to every component that talks to the
/// device; nothing holds a global connection.
pub trait Device {
    /// Read the subtree at `path`
    ///
    /// Returns the response body (a single-key object named after the
    /// qualified terminal segment), or `None` when the device reports that
    /// nothing exists there.
    fn get(&mut self, path: &Path) -> std::result::Result<Option<Value>, DeviceError>;

    /// Send one mutation and return the HTTP status
    ///
    /// A non-2xx answer may come back either as `Ok(status)` or as an error
    /// carrying the status; the executor treats both as a failure.
    fn send(&mut self, op: &Operation) -> std::result::Result<u16, DeviceError>;
}

impl<D: Device + ?Sized> Device for &mut D {
    fn get(&mut self, path: &Path) -> std::result::Result<Option<Value>, DeviceError> {
        (**self).get(path)
    }

    fn send(&mut self, op: &Operation) -> std::result::Result<u16, DeviceError> {
        (**self).send(op)
    }
}

impl<D: Device + ?Sized> Device for Box<D> {
    fn get(&mut self, path: &Path) -> std::result::Result<Option<Value>, DeviceError> {
        (**self).get(path)
    }

    fn send(&mut self, op: &Operation) -> std::result::Result<u16, DeviceError> {
        (**self).send(op)
    }
}

/// Progress callback for execution
///
/// Implement this trait to receive progress updates while operations are sent.
pub trait ProgressCallback {
    /// Called with the full batch before confirmation is asked
    fn on_plan(&mut self, _ops: &[Operation]) {}

    /// Called before the first operation of a batch
    fn on_batch_start(&mut self, count: usize);

    /// Called before an operation is sent
    fn on_operation_start(&mut self, index: usize, op: &Operation);

    /// Called when the device accepted an operation
    fn on_operation_complete(&mut self, index: usize, op: &Operation, status: u16);

    /// Called when an operation failed; no further operations follow
    fn on_operation_failed(&mut self, index: usize, op: &Operation, message: &str);

    /// Called after the batch, whether or not it completed
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_operation_start(&mut self, _index: usize, _op: &Operation) {}
    fn on_operation_complete(&mut self, _index: usize, _op: &Operation, _status: u16) {}
    fn on_operation_failed(&mut self, _index: usize, _op: &Operation, _message: &str) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
