//! Typed remote state labels.

use std::borrow::Cow;
use std::fmt;

/// A remote resource status, parsed from the label the remote reports.
///
/// Remote systems report their state machine as opaque strings. Implement
/// this trait on a closed enum with an explicit catch-all variant so that
/// labels nobody anticipated stay representable and can be rejected as
/// unexpected rather than misread.
///
/// # Examples
///
/// ```rust
/// use slackwater::poll::StateLabel;
/// use std::borrow::Cow;
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum RuleState {
///     Active,
///     Deleting,
///     Unrecognized(String),
/// }
///
/// impl StateLabel for RuleState {
///     fn from_label(label: &str) -> Self {
///         match label {
///             "ACTIVE" => Self::Active,
///             "DELETING" => Self::Deleting,
///             other => Self::Unrecognized(other.to_string()),
///         }
///     }
///
///     fn label(&self) -> Cow<'_, str> {
///         match self {
///             Self::Active => "ACTIVE".into(),
///             Self::Deleting => "DELETING".into(),
///             Self::Unrecognized(other) => other.as_str().into(),
///         }
///     }
/// }
///
/// assert_eq!(RuleState::from_label("DELETING"), RuleState::Deleting);
/// assert_eq!(RuleState::from_label("FAILED").label(), "FAILED");
/// ```
pub trait StateLabel: Clone + PartialEq + fmt::Debug {
    /// Map a reported label onto the closed set of states.
    fn from_label(label: &str) -> Self;

    /// The label as the remote reports it.
    fn label(&self) -> Cow<'_, str>;
}

/// An untyped state label, for remotes without a known state machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawState(pub String);

impl RawState {
    /// Wrap a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl StateLabel for RawState {
    fn from_label(label: &str) -> Self {
        Self(label.to_string())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }
}

impl From<&str> for RawState {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// The label of an optional state; absence reads as the empty label.
pub fn label_of<S: StateLabel>(state: &Option<S>) -> Cow<'_, str> {
    match state {
        Some(s) => s.label(),
        None => Cow::Borrowed(""),
    }
}

/// One result of probing a remote resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation<T, S> {
    /// The resource exists in the given state.
    Present {
        /// The state the remote reported.
        state: S,
        /// Whatever else the probe read.
        payload: T,
    },
    /// The resource no longer exists.
    Absent,
}

impl<T, S> Observation<T, S> {
    /// A resource that exists.
    pub fn present(state: S, payload: T) -> Self {
        Self::Present { state, payload }
    }

    /// The observed state, `None` when absent.
    pub fn state(&self) -> Option<&S> {
        match self {
            Self::Present { state, .. } => Some(state),
            Self::Absent => None,
        }
    }

    /// Returns true if the resource no longer exists.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Split into the observed state and payload.
    pub fn into_parts(self) -> (Option<S>, Option<T>) {
        match self {
            Self::Present { state, payload } => (Some(state), Some(payload)),
            Self::Absent => (None, None),
        }
    }

    /// The payload, if present.
    pub fn into_payload(self) -> Option<T> {
        self.into_parts().1
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    #[test]
    fn test_raw_state_round_trips() {
        let state = RawState::from_label("DELETING_RESULTS");
        assert_eq!(state.label(), "DELETING_RESULTS");
        assert_eq!(state, RawState::from("DELETING_RESULTS"));
    }

    #[test]
    fn test_absent_reads_as_empty_label() {
        assert_eq!(label_of::<RawState>(&None), "");
        assert_eq!(label_of(&Some(RawState::new("ACTIVE"))), "ACTIVE");
    }

    #[test]
    fn test_observation_parts() {
        let present = Observation::present(RawState::new("ACTIVE"), 3);
        assert_eq!(present.state(), Some(&RawState::new("ACTIVE")));
        assert_eq!(present.into_parts(), (Some(RawState::new("ACTIVE")), Some(3)));

        let absent: Observation<i32, RawState> = Observation::Absent;
        assert!(absent.is_absent());
        assert_eq!(absent.into_payload(), None);
    }
}
