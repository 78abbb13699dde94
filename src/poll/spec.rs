//! What a wait is waiting for.

use std::time::Duration;

use super::state::StateLabel;

/// The pending and target states of a wait, and how to pace it.
///
/// States are held as `Option<S>`, where `None` is the resource being gone
/// (the empty label). Waiting for deletion means a target of `None`.
///
/// # Examples
///
/// ```rust
/// use slackwater::poll::{RawState, WaitSpec};
/// use std::time::Duration;
///
/// let spec = WaitSpec::until_absent(
///     [RawState::new("ACTIVE"), RawState::new("DELETING")],
///     Duration::from_secs(300),
/// );
/// assert!(spec.is_target(&None));
/// assert!(spec.is_pending(&Some(RawState::new("DELETING"))));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaitSpec<S> {
    pub(crate) pending: Vec<Option<S>>,
    pub(crate) target: Vec<Option<S>>,
    pub(crate) timeout: Duration,
    pub(crate) delay: Duration,
    pub(crate) min_poll_interval: Duration,
    pub(crate) max_poll_interval: Duration,
    pub(crate) continuous_target_occurrence: u32,
}

impl<S: StateLabel> WaitSpec<S> {
    /// Wait at most `timeout` for the resource to reach a target state.
    ///
    /// Starts with no pending and no target states; add them with
    /// [`pending`](Self::pending), [`target`](Self::target) and
    /// [`target_absent`](Self::target_absent).
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Vec::new(),
            target: Vec::new(),
            timeout,
            delay: Duration::ZERO,
            min_poll_interval: Duration::from_millis(100),
            max_poll_interval: Duration::from_secs(10),
            continuous_target_occurrence: 1,
        }
    }

    /// Wait for the resource to disappear while it reports one of `pending`.
    pub fn until_absent(pending: impl IntoIterator<Item = S>, timeout: Duration) -> Self {
        Self::new(timeout).pending(pending).target_absent()
    }

    /// Add states that mean the remote is still working.
    pub fn pending(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.pending.extend(states.into_iter().map(Some));
        self
    }

    /// Treat absence of the resource as still pending.
    pub fn pending_absent(mut self) -> Self {
        self.pending.push(None);
        self
    }

    /// Add states that end the wait successfully.
    pub fn target(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.target.extend(states.into_iter().map(Some));
        self
    }

    /// Treat absence of the resource as success.
    pub fn target_absent(mut self) -> Self {
        self.target.push(None);
        self
    }

    /// Wait this long before the first probe.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Bounds of the sleep between probes. The interval starts at `min`
    /// and doubles up to `max`.
    pub fn with_poll_interval(mut self, min: Duration, max: Duration) -> Self {
        self.min_poll_interval = min;
        self.max_poll_interval = max.max(min);
        self
    }

    /// Number of consecutive target observations required to succeed.
    ///
    /// Useful when a remote flaps between states right after a change.
    /// Values below 1 are treated as 1.
    pub fn with_continuous_target_occurrence(mut self, n: u32) -> Self {
        self.continuous_target_occurrence = n.max(1);
        self
    }

    /// The overall time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns true if `state` ends the wait.
    pub fn is_target(&self, state: &Option<S>) -> bool {
        self.target.contains(state)
    }

    /// Returns true if `state` means keep waiting.
    pub fn is_pending(&self, state: &Option<S>) -> bool {
        self.pending.contains(state)
    }

    /// The target states.
    pub fn targets(&self) -> &[Option<S>] {
        &self.target
    }

    pub(crate) fn next_interval(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_poll_interval)
    }
}

#[cfg(test)]
mod spec_tests {
    use super::*;
    use crate::poll::RawState;

    #[test]
    fn test_until_absent_targets_absence() {
        let spec = WaitSpec::until_absent([RawState::new("ACTIVE")], Duration::from_secs(1));
        assert!(spec.is_target(&None));
        assert!(!spec.is_pending(&None));
        assert!(spec.is_pending(&Some(RawState::new("ACTIVE"))));
        assert!(!spec.is_target(&Some(RawState::new("ACTIVE"))));
    }

    #[test]
    fn test_poll_interval_doubles_to_cap() {
        let spec = WaitSpec::<RawState>::new(Duration::from_secs(60))
            .with_poll_interval(Duration::from_millis(100), Duration::from_millis(300));
        assert_eq!(spec.next_interval(Duration::from_millis(100)), Duration::from_millis(200));
        assert_eq!(spec.next_interval(Duration::from_millis(200)), Duration::from_millis(300));
    }

    #[test]
    fn test_poll_interval_max_never_below_min() {
        let spec = WaitSpec::<RawState>::new(Duration::from_secs(60))
            .with_poll_interval(Duration::from_millis(500), Duration::from_millis(100));
        assert_eq!(spec.max_poll_interval, Duration::from_millis(500));
    }

    #[test]
    fn test_continuous_occurrence_floor() {
        let spec = WaitSpec::<RawState>::new(Duration::from_secs(1))
            .with_continuous_target_occurrence(0);
        assert_eq!(spec.continuous_target_occurrence, 1);
    }
}
