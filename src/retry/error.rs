//! Error types for retry operations.

use std::fmt;
use std::time::Duration;

/// The outcome of one failed attempt, as classified by the operation itself.
///
/// An operation passed to [`retry`](super::retry) decides for each failure
/// whether trying again could help.
///
/// # Examples
///
/// ```rust
/// use slackwater::retry::Attempt;
///
/// fn classify(code: &str) -> Attempt<String> {
///     if code == "InsufficientPermissionsException" {
///         Attempt::retryable(code.to_string())
///     } else {
///         Attempt::fatal(code.to_string())
///     }
/// }
///
/// assert!(classify("InsufficientPermissionsException").is_retryable());
/// assert!(!classify("ValidationException").is_retryable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<E> {
    /// The failure is transient; the attempt may be repeated.
    Retryable(E),
    /// The failure is permanent; stop immediately.
    Fatal(E),
}

impl<E> Attempt<E> {
    /// A transient failure.
    pub fn retryable(error: E) -> Self {
        Self::Retryable(error)
    }

    /// A permanent failure.
    pub fn fatal(error: E) -> Self {
        Self::Fatal(error)
    }

    /// Classify `error` from a boolean verdict.
    pub fn classify(error: E, transient: bool) -> Self {
        if transient {
            Self::Retryable(error)
        } else {
            Self::Fatal(error)
        }
    }

    /// Returns true if the failure is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// Discard the classification.
    pub fn into_inner(self) -> E {
        match self {
            Self::Retryable(e) | Self::Fatal(e) => e,
        }
    }
}

/// Error returned by the retry executor.
///
/// # Examples
///
/// ```rust
/// use slackwater::retry::{retry, Attempt, RetryError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let result = retry(Duration::from_secs(1), || async {
///     Err::<(), _>(Attempt::fatal("access denied"))
/// })
/// .await;
///
/// match result {
///     Err(RetryError::Fatal { error, attempts }) => {
///         assert_eq!(error, "access denied");
///         assert_eq!(attempts, 1);
///     }
///     other => panic!("Expected fatal error, got {:?}", other),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// An attempt failed with a non-retryable error.
    Fatal {
        /// The error from the failing attempt.
        error: E,
        /// Total number of attempts made.
        attempts: u32,
    },
    /// The elapsed budget ran out while attempts kept failing transiently.
    TimedOut {
        /// The error from the final attempt.
        last_error: E,
        /// Total number of attempts made.
        attempts: u32,
        /// Time spent from the first attempt until giving up.
        elapsed: Duration,
        /// The budget that was exceeded.
        timeout: Duration,
    },
}

impl<E> RetryError<E> {
    /// Returns true if the elapsed budget was exhausted.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns true if an attempt failed with a non-retryable error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fatal { attempts, .. } | Self::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// Get a reference to the underlying error.
    pub fn inner(&self) -> &E {
        match self {
            Self::Fatal { error, .. } => error,
            Self::TimedOut { last_error, .. } => last_error,
        }
    }

    /// Extract the underlying error, discarding metadata.
    pub fn into_inner(self) -> E {
        match self {
            Self::Fatal { error, .. } => error,
            Self::TimedOut { last_error, .. } => last_error,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal { error, attempts } => {
                write!(f, "non-retryable error on attempt {}: {}", attempts, error)
            }
            Self::TimedOut {
                last_error,
                attempts,
                elapsed,
                timeout,
            } => write!(
                f,
                "timeout while retrying ({:?} budget, {} attempts in {:?}), last error: {}",
                timeout, attempts, elapsed, last_error
            ),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner())
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_timed_out_display() {
        let err = RetryError::TimedOut {
            last_error: "InsufficientPermissionsException",
            attempts: 3,
            elapsed: Duration::from_millis(500),
            timeout: Duration::from_millis(400),
        };
        let display = err.to_string();
        assert!(display.contains("timeout"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("InsufficientPermissionsException"));
        assert!(err.is_timeout());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_into_inner() {
        let err = RetryError::Fatal {
            error: "boom",
            attempts: 1,
        };
        assert!(err.is_fatal());
        assert_eq!(err.attempts(), 1);
        assert_eq!(err.into_inner(), "boom");
    }

    #[test]
    fn test_attempt_classify() {
        assert_eq!(Attempt::classify(1, true), Attempt::Retryable(1));
        assert_eq!(Attempt::classify(1, false), Attempt::Fatal(1));
        assert_eq!(Attempt::retryable(7).into_inner(), 7);
    }
}
