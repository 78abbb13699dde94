//! Error types for state waits.

use std::fmt;
use std::time::Duration;

use super::state::{label_of, StateLabel};

/// Error returned when a wait does not reach its target.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitError<S, E> {
    /// The refresh probe itself failed. Probe errors are not retried.
    Refresh(E),
    /// The remote reported a state that is neither pending nor a target.
    UnexpectedState {
        /// The state that was observed; `None` means the resource was gone.
        state: Option<S>,
        /// The states that would have ended the wait.
        expected: Vec<Option<S>>,
        /// Number of probes made, including the offending one.
        probes: u32,
    },
    /// The time budget ran out while the state was still pending.
    TimedOut {
        /// The last state observed.
        last_state: Option<S>,
        /// The budget that was exceeded.
        timeout: Duration,
        /// Number of probes made.
        probes: u32,
    },
}

impl<S, E> WaitError<S, E> {
    /// Returns true if the time budget was exhausted.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns true if the remote entered an unanticipated state.
    pub fn is_unexpected_state(&self) -> bool {
        matches!(self, Self::UnexpectedState { .. })
    }

    /// Number of probes made, when known.
    pub fn probes(&self) -> Option<u32> {
        match self {
            Self::Refresh(_) => None,
            Self::UnexpectedState { probes, .. } | Self::TimedOut { probes, .. } => Some(*probes),
        }
    }
}

impl<S: StateLabel, E: fmt::Display> fmt::Display for WaitError<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refresh(e) => write!(f, "refreshing state failed: {}", e),
            Self::UnexpectedState {
                state, expected, ..
            } => {
                let expected: Vec<_> = expected.iter().map(label_of).collect();
                write!(
                    f,
                    "unexpected state '{}', wanted target '{}'",
                    label_of(state),
                    expected.join(", ")
                )
            }
            Self::TimedOut {
                last_state,
                timeout,
                probes,
            } => write!(
                f,
                "timeout while waiting for state to change (last state: '{}', timeout: {:?}, {} probes)",
                label_of(last_state),
                timeout,
                probes
            ),
        }
    }
}

impl<S, E> std::error::Error for WaitError<S, E>
where
    S: StateLabel + 'static,
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Refresh(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use crate::poll::RawState;

    #[test]
    fn test_unexpected_state_display() {
        let err: WaitError<RawState, String> = WaitError::UnexpectedState {
            state: Some(RawState::new("FAILED")),
            expected: vec![None],
            probes: 1,
        };
        assert_eq!(err.to_string(), "unexpected state 'FAILED', wanted target ''");
        assert!(err.is_unexpected_state());
        assert_eq!(err.probes(), Some(1));
    }

    #[test]
    fn test_timed_out_display() {
        let err: WaitError<RawState, String> = WaitError::TimedOut {
            last_state: Some(RawState::new("DELETING")),
            timeout: Duration::from_secs(300),
            probes: 12,
        };
        let display = err.to_string();
        assert!(display.contains("timeout"));
        assert!(display.contains("DELETING"));
        assert!(err.is_timeout());
    }
}
