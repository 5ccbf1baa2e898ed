//! Error types for RESTCONF requests.
//!
//! Errors are categorized so the retry loop can tell a flaky management
//! plane from a request the device will never accept.

use std::fmt;

use declarative::DeviceError;

/// Result type alias for RESTCONF operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of RESTCONF errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection refused, reset, timed out (transient, retryable).
    Network,
    /// Device busy or restarting its REST server (transient, retryable).
    Unavailable,
    /// Credentials rejected.
    Auth,
    /// Nothing exists at the requested path.
    NotFound,
    /// Request rejected by the device (bad payload, unsupported path).
    Rejected,
    /// Device answered with something that is not JSON.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether a read failing this way may succeed if sent again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Unavailable)
    }

    /// Short label shown to the operator.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Switch unreachable",
            Self::Unavailable => "Device management service unavailable",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Path not found",
            Self::Rejected => "Request rejected by the device",
            Self::Format => "Invalid response format",
            Self::Other => "Unexpected RESTCONF error",
        }
    }

    /// What the operator can check next.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check that the switch is reachable and the port is correct",
            Self::Unavailable => "Wait for the management framework to come up and try again",
            Self::Auth => "Check --username/--password or SONIC_USERNAME/SONIC_PASSWORD",
            Self::NotFound => "The resource may not be supported by this SONiC release",
            Self::Rejected => "Run with -vv to see the request that was rejected",
            Self::Format => "Check that the host runs the SONiC management framework",
            Self::Other => "Rerun with -vvv to see the request and response bodies",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to a device.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed or returned an error status.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if the device answered.
        status: Option<u16>,
    },

    /// Response body could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Connection settings are unusable.
    #[error("invalid connection settings: {0}")]
    Config(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// HTTP status the device answered with, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Classify by HTTP status; no status means the switch never answered.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { status: None, .. } => ErrorCategory::Network,
            Self::Http {
                status: Some(status),
                ..
            } => match status {
                401 | 403 => ErrorCategory::Auth,
                404 => ErrorCategory::NotFound,
                408 | 429 | 502 | 503 | 504 => ErrorCategory::Unavailable,
                400..=499 => ErrorCategory::Rejected,
                _ => ErrorCategory::Other,
            },
            Self::InvalidResponse(_) => ErrorCategory::Format,
            Self::Config(_) => ErrorCategory::Other,
        }
    }

    /// Whether a read should be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<Error> for DeviceError {
    fn from(err: Error) -> Self {
        let status = err.status();
        let message = match &err {
            Error::Http { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}
