//! Error types for path construction and parsing.

/// Result type alias for path operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or parsing a resource path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A segment is malformed (empty name, empty key value, reserved characters).
    #[error("invalid segment `{segment}`: {reason}")]
    InvalidSegment {
        /// The offending segment text.
        segment: String,
        /// Why the segment was rejected.
        reason: String,
    },

    /// A key value contains a broken percent-escape.
    #[error("invalid percent-encoding in `{0}`")]
    InvalidEncoding(String),
}

impl Error {
    /// Create an invalid segment error.
    pub fn segment(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSegment {
            segment: segment.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::segment("interface=", "empty key value");
        assert_eq!(
            err.to_string(),
            "invalid segment `interface=`: empty key value"
        );

        let err = Error::InvalidEncoding("Eth1%2".to_string());
        assert!(err.to_string().contains("Eth1%2"));
    }
}
