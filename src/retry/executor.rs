//! The retry loop.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::TryFutureExt;
use tokio::time::Instant;

use super::error::{Attempt, RetryError};
use super::policy::BackoffPolicy;

/// Retry an operation that classifies its own failures.
///
/// Uses [`BackoffPolicy::default`]. See [`retry_with_policy`].
pub async fn retry<T, E, F, Fut>(max_elapsed: Duration, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
    E: fmt::Display,
{
    retry_with_policy(&BackoffPolicy::default(), max_elapsed, op).await
}

/// Retry an operation, classifying failures with a predicate.
///
/// `is_transient` returns true for errors worth another attempt; all other
/// errors stop the loop immediately.
///
/// # Example
///
/// ```rust
/// use slackwater::retry::retry_if;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let calls = &AtomicU32::new(0);
/// let result = retry_if(
///     Duration::from_secs(5),
///     move || async move {
///         match calls.fetch_add(1, Ordering::SeqCst) {
///             0 => Err("InsufficientPermissionsException"),
///             _ => Ok("rule-1"),
///         }
///     },
///     |code| *code == "InsufficientPermissionsException",
/// )
/// .await;
///
/// assert_eq!(result, Ok("rule-1"));
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// # });
/// ```
pub async fn retry_if<T, E, F, Fut, P>(
    max_elapsed: Duration,
    op: F,
    is_transient: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display,
{
    retry_if_with_policy(&BackoffPolicy::default(), max_elapsed, op, is_transient).await
}

/// [`retry_if`] with an explicit backoff policy.
pub async fn retry_if_with_policy<T, E, F, Fut, P>(
    policy: &BackoffPolicy,
    max_elapsed: Duration,
    mut op: F,
    is_transient: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display,
{
    let is_transient = &is_transient;
    retry_with_policy(policy, max_elapsed, move || {
        op().map_err(move |error| {
            let transient = is_transient(&error);
            Attempt::classify(error, transient)
        })
    })
    .await
}

/// Invoke `op` until it succeeds, fails fatally, or `max_elapsed` runs out.
///
/// `op` is always invoked at least once. After a retryable failure the
/// executor sleeps the next backoff delay, shortened so that no sleep runs
/// past the deadline, and tries again. Once the deadline has passed, the
/// next retryable failure ends the loop with [`RetryError::TimedOut`]
/// carrying that failure. Total time is therefore at least `max_elapsed`
/// (when every attempt is transient) and at most `max_elapsed` plus the
/// duration of the final attempt.
///
/// `op` may run several times, so it must be idempotent from the caller's
/// point of view.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: &BackoffPolicy,
    max_elapsed: Duration,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
    E: fmt::Display,
{
    let start = Instant::now();
    // None when the budget is too large to represent; such a loop never times out.
    let deadline = start.checked_add(max_elapsed);
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        let error = match op().await {
            Ok(value) => {
                #[cfg(feature = "tracing")]
                if attempts > 1 {
                    tracing::debug!(attempts, elapsed = ?start.elapsed(), "operation succeeded after retries");
                }
                return Ok(value);
            }
            Err(Attempt::Fatal(error)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempts, %error, "non-retryable error");
                return Err(RetryError::Fatal { error, attempts });
            }
            Err(Attempt::Retryable(error)) => error,
        };

        let now = Instant::now();
        if deadline.is_some_and(|deadline| now >= deadline) {
            let elapsed = now - start;
            #[cfg(feature = "tracing")]
            tracing::error!(attempts, ?elapsed, timeout = ?max_elapsed, %error, "gave up retrying");
            return Err(RetryError::TimedOut {
                last_error: error,
                attempts,
                elapsed,
                timeout: max_elapsed,
            });
        }

        let delay = match deadline {
            Some(deadline) => policy.jittered_delay(attempts - 1).min(deadline - now),
            None => policy.jittered_delay(attempts - 1),
        };

        #[cfg(feature = "tracing")]
        tracing::warn!(attempts, delay_ms = delay.as_millis() as u64, %error, "retryable error, retrying");

        tokio::time::sleep(delay).await;
    }
}
