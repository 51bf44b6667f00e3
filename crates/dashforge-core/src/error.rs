//! Error types for configuration resolution.

use thiserror::Error;

/// Result alias for resolution operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while normalizing codes or assembling a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Metric identifier could not be normalized.
    #[error("invalid metric code '{code}': {reason}")]
    InvalidMetricCode {
        /// The offending input, verbatim
        code: String,
        /// What was wrong with it
        reason: String,
    },

    /// Pattern is not usable for matching.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// What was wrong with it
        reason: String,
    },

    /// Required field missing from a metric entry.
    #[error("missing required field '{field}' in {context}")]
    MissingField {
        /// Field name
        field: &'static str,
        /// Where the field was expected
        context: String,
    },
}

impl Error {
    pub(crate) fn invalid_code(code: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMetricCode {
            code: code.to_string(),
            reason: reason.into(),
        }
    }

    /// The offending metric code, when this is a normalization failure.
    pub fn metric_code(&self) -> Option<&str> {
        match self {
            Self::InvalidMetricCode { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_metric_code_display() {
        let err = Error::invalid_code("bad code", "expected `domain.Name`");
        assert_eq!(
            err.to_string(),
            "invalid metric code 'bad code': expected `domain.Name`"
        );
        assert_eq!(err.metric_code(), Some("bad code"));
    }

    #[test]
    fn test_missing_field_display() {
        let err = Error::MissingField {
            field: "code",
            context: "metric entry #2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing required field 'code' in metric entry #2"
        );
        assert_eq!(err.metric_code(), None);
    }

    #[test]
    fn test_invalid_pattern_display() {
        let err = Error::InvalidPattern {
            pattern: String::new(),
            reason: "pattern is empty".to_string(),
        };
        assert!(err.to_string().contains("pattern is empty"));
    }
}
