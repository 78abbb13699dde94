//! Bounded retry for calls that fail transiently.
//!
//! Remote control planes are eventually consistent. A call made right after
//! a permission grant can fail with an authorization error simply because
//! the grant has not propagated yet. This module retries such calls with
//! capped exponential backoff until they succeed, fail for a reason that
//! retrying cannot fix, or run out of time.
//!
//! The operation decides what is transient, either by returning
//! [`Attempt::Retryable`] / [`Attempt::Fatal`] itself ([`retry`]) or through
//! a predicate ([`retry_if`]).
//!
//! # Quick Start
//!
//! ```rust
//! use slackwater::retry::{retry, Attempt};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let calls = &AtomicU32::new(0);
//!
//! let result = retry(Duration::from_secs(5), move || async move {
//!     if calls.fetch_add(1, Ordering::SeqCst) < 2 {
//!         Err(Attempt::retryable("not yet"))
//!     } else {
//!         Ok(42)
//!     }
//! })
//! .await;
//!
//! assert_eq!(result, Ok(42));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # });
//! ```
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to spread delays randomly:
//!
//! ```toml
//! slackwater = { version = "...", features = ["jitter"] }
//! ```

mod error;
mod executor;
mod policy;

pub use error::{Attempt, RetryError};
pub use executor::{retry, retry_if, retry_if_with_policy, retry_with_policy};
pub use policy::{BackoffPolicy, BackoffStrategy, JitterStrategy};
