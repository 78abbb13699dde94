//! The polling loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::error::WaitError;
use super::spec::WaitSpec;
use super::state::{Observation, StateLabel};

/// Probe a remote resource until it reaches a target state.
///
/// Each iteration calls `refresh` once and checks the result:
///
/// - a refresh error ends the wait with [`WaitError::Refresh`];
/// - a target state counts towards success, and once it has been seen
///   `continuous_target_occurrence` times in a row the wait returns the
///   latest payload (`None` when the target was absence);
/// - a state that is neither pending nor target ends the wait with
///   [`WaitError::UnexpectedState`];
/// - a pending state sleeps for the poll interval and probes again, unless
///   the time budget is spent, which ends with [`WaitError::TimedOut`].
///
/// Sleeps never run past the deadline. A refresh that wants to retry its
/// own transient failures should use [`retry`](crate::retry::retry)
/// internally.
///
/// # Example
///
/// ```rust
/// use slackwater::poll::{wait_for_state, Observation, RawState, WaitSpec};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let probes = &AtomicU32::new(0);
/// let spec = WaitSpec::until_absent([RawState::new("DELETING")], Duration::from_secs(5))
///     .with_poll_interval(Duration::from_millis(1), Duration::from_millis(1));
///
/// let result = wait_for_state(&spec, move || async move {
///     match probes.fetch_add(1, Ordering::SeqCst) {
///         0 => Ok::<_, String>(Observation::present(RawState::new("DELETING"), ())),
///         _ => Ok(Observation::Absent),
///     }
/// })
/// .await;
///
/// assert_eq!(result, Ok(None));
/// assert_eq!(probes.load(Ordering::SeqCst), 2);
/// # });
/// ```
pub async fn wait_for_state<T, S, E, F, Fut>(
    spec: &WaitSpec<S>,
    mut refresh: F,
) -> Result<Option<T>, WaitError<S, E>>
where
    S: StateLabel,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Observation<T, S>, E>>,
{
    let start = Instant::now();
    let deadline = start.checked_add(spec.timeout);

    if !spec.delay.is_zero() {
        tokio::time::sleep(spec.delay.min(spec.timeout)).await;
    }

    let mut probes = 0u32;
    let mut target_hits = 0u32;
    let mut interval = spec.min_poll_interval;

    loop {
        probes += 1;
        let (state, payload) = refresh().await.map_err(WaitError::Refresh)?.into_parts();

        #[cfg(feature = "tracing")]
        tracing::trace!(probes, state = %super::label_of(&state), "observed state");

        if spec.is_target(&state) {
            target_hits += 1;
            if target_hits >= spec.continuous_target_occurrence {
                #[cfg(feature = "tracing")]
                tracing::debug!(probes, state = %super::label_of(&state), elapsed = ?start.elapsed(), "reached target state");
                return Ok(payload);
            }
        } else if spec.is_pending(&state) {
            target_hits = 0;
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!(probes, state = %super::label_of(&state), "unexpected state");
            return Err(WaitError::UnexpectedState {
                state,
                expected: spec.target.clone(),
                probes,
            });
        }

        let now = Instant::now();
        if deadline.is_some_and(|deadline| now >= deadline) {
            return Err(WaitError::TimedOut {
                last_state: state,
                timeout: spec.timeout,
                probes,
            });
        }

        let pause = match deadline {
            Some(deadline) => interval.min(deadline - now),
            None => interval,
        };
        tokio::time::sleep(pause).await;
        interval = spec.next_interval(interval.max(Duration::from_millis(1)));
    }
}
