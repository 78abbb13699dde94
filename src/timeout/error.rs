//! Configuration errors raised while resolving timeouts.

use std::fmt;

use super::duration::DurationParseError;
use super::Operation;

/// Error returned when caller-supplied timeouts cannot be applied.
///
/// These are configuration mistakes: they are surfaced to the caller as-is
/// and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutConfigError {
    /// The override key is not one of `create`, `read`, `update`, `delete`
    /// or `default`.
    UnsupportedTimeoutKey {
        /// The key as it appeared in the configuration.
        key: String,
    },
    /// The resource does not declare a timeout for this operation, so it
    /// cannot be overridden.
    TimeoutNotDeclared {
        /// The operation the override targeted.
        operation: Operation,
    },
    /// The override value is not a valid positive duration.
    InvalidDurationFormat {
        /// The operation the override targeted.
        operation: Operation,
        /// The value as it appeared in the configuration.
        value: String,
        /// Why the value was rejected.
        reason: DurationParseError,
    },
}

impl TimeoutConfigError {
    /// The operation this error refers to, if the key was recognized.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::UnsupportedTimeoutKey { .. } => None,
            Self::TimeoutNotDeclared { operation } => Some(*operation),
            Self::InvalidDurationFormat { operation, .. } => Some(*operation),
        }
    }
}

impl fmt::Display for TimeoutConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedTimeoutKey { key } => {
                write!(f, "unsupported timeout key found ({})", key)
            }
            Self::TimeoutNotDeclared { operation } => {
                write!(f, "timeout ({}) is not supported by this resource", operation)
            }
            Self::InvalidDurationFormat {
                operation,
                value,
                reason,
            } => write!(
                f,
                "error parsing timeout for ({}): {:?}: {}",
                operation, value, reason
            ),
        }
    }
}

impl std::error::Error for TimeoutConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDurationFormat { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_display_names_the_key() {
        let err = TimeoutConfigError::UnsupportedTimeoutKey {
            key: "destroy".to_string(),
        };
        assert!(err.to_string().contains("destroy"));
        assert_eq!(err.operation(), None);
    }

    #[test]
    fn test_invalid_duration_exposes_source() {
        use std::error::Error;

        let err = TimeoutConfigError::InvalidDurationFormat {
            operation: Operation::Create,
            value: "ten minutes".to_string(),
            reason: DurationParseError::UnknownUnit(" minutes".to_string()),
        };
        assert_eq!(err.operation(), Some(Operation::Create));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("create"));
    }
}
