//! Error types for reconciliation.

use yangpath::Path;

use crate::types::Method;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a reconciliation run.
///
/// Schema mismatches found while reading facts are not errors; they are
/// collected in [`crate::normalize::Facts`] and the affected field is treated
/// as absent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The desired configuration does not fit the resource schema.
    ///
    /// Raised before the device is contacted.
    #[error("invalid config at `{at}`: {message}")]
    InvalidConfig {
        /// Dotted location inside the desired config.
        at: String,
        /// What is wrong with it.
        message: String,
    },

    /// A path could not be built or parsed.
    #[error(transparent)]
    Path(#[from] yangpath::Error),

    /// A request failed or returned a status outside 2xx.
    ///
    /// Operations sent before the failing one remain applied.
    #[error("{method} {path} failed: {message}")]
    Transport {
        /// Method of the failing request.
        method: Method,
        /// Target of the failing request.
        path: Path,
        /// HTTP status, when the device answered.
        status: Option<u16>,
        /// Error detail from the device or the transport.
        message: String,
        /// Number of operations applied before the failure.
        applied: usize,
    },

    /// The run was stopped by a callback (e.g. a failed confirmation prompt).
    #[error("{0}")]
    Interrupted(String),
}

impl Error {
    /// Create an invalid config error.
    pub fn invalid(at: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            at: at.into(),
            message: message.into(),
        }
    }

    /// Whether this error was raised before any request was sent.
    pub fn is_pre_flight(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::Path(_))
    }

    /// HTTP status attached to a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Operations the device accepted before this error stopped the run.
    pub fn applied(&self) -> usize {
        match self {
            Self::Transport { applied, .. } => *applied,
            _ => 0,
        }
    }
}
