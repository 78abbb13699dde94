//! Testing utilities for code built on slackwater.
//!
//! This module provides a scripted in-memory [`RemoteApi`] and assertion
//! macros for the error shapes the engine produces.
//!
//! # Examples
//!
//! ## Scripted remote
//!
//! ```rust
//! use slackwater::poll::{Observation, RawState};
//! use slackwater::testing::{MockApiError, MockRemote, NamedConfig};
//!
//! let remote = MockRemote::<NamedConfig, String, RawState>::new()
//!     .with_put(Err(MockApiError::new("InsufficientPermissionsException")))
//!     .with_describe(Ok(Observation::present(RawState::new("ACTIVE"), "rule".to_string())))
//!     .with_describe(Err(MockApiError::not_found("NoSuchConfigRuleException")));
//! ```
//!
//! Once a script runs dry the remote behaves like a healthy, empty
//! control plane: puts and deletes succeed and describes report absence.

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::lifecycle::{ApiError, Identity, RemoteApi, Resource};
use crate::poll::{Observation, StateLabel};

/// An API error with a code, as a scripted remote reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockApiError {
    code: String,
    not_found: bool,
}

impl MockApiError {
    /// An error with the given code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            not_found: false,
        }
    }

    /// A not-found error with the given code.
    pub fn not_found(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            not_found: true,
        }
    }
}

impl fmt::Display for MockApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: mock remote error", self.code)
    }
}

impl std::error::Error for MockApiError {}

impl ApiError for MockApiError {
    fn code(&self) -> &str {
        &self.code
    }

    fn is_not_found(&self) -> bool {
        self.not_found
    }
}

/// A minimal desired configuration: just a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedConfig {
    name: String,
}

impl NamedConfig {
    /// A configuration for the resource called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for NamedConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

type Script<T> = Mutex<VecDeque<Result<T, MockApiError>>>;

/// A [`RemoteApi`] that replays scripted responses and counts calls.
pub struct MockRemote<C, O, S> {
    puts: Script<()>,
    describes: Script<Observation<O, S>>,
    deletes: Script<()>,
    put_calls: AtomicU32,
    describe_calls: AtomicU32,
    delete_calls: AtomicU32,
    _config: PhantomData<fn(&C)>,
}

impl<C, O, S> fmt::Debug for MockRemote<C, O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRemote")
            .field("put_calls", &self.put_calls())
            .field("describe_calls", &self.describe_calls())
            .field("delete_calls", &self.delete_calls())
            .finish()
    }
}

impl<C, O, S> Default for MockRemote<C, O, S> {
    fn default() -> Self {
        Self {
            puts: Mutex::new(VecDeque::new()),
            describes: Mutex::new(VecDeque::new()),
            deletes: Mutex::new(VecDeque::new()),
            put_calls: AtomicU32::new(0),
            describe_calls: AtomicU32::new(0),
            delete_calls: AtomicU32::new(0),
            _config: PhantomData,
        }
    }
}

impl<C, O, S> MockRemote<C, O, S> {
    /// A remote with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response of the next unscripted put.
    pub fn with_put(self, response: Result<(), MockApiError>) -> Self {
        push(&self.puts, response);
        self
    }

    /// Queue the response of the next unscripted describe.
    pub fn with_describe(self, response: Result<Observation<O, S>, MockApiError>) -> Self {
        push(&self.describes, response);
        self
    }

    /// Queue the response of the next unscripted delete.
    pub fn with_delete(self, response: Result<(), MockApiError>) -> Self {
        push(&self.deletes, response);
        self
    }

    /// Number of put calls made.
    pub fn put_calls(&self) -> u32 {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Number of describe calls made.
    pub fn describe_calls(&self) -> u32 {
        self.describe_calls.load(Ordering::SeqCst)
    }

    /// Number of delete calls made.
    pub fn delete_calls(&self) -> u32 {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

fn push<T>(script: &Script<T>, response: Result<T, MockApiError>) {
    script
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(response);
}

fn pop<T>(script: &Script<T>) -> Option<Result<T, MockApiError>> {
    script
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

impl<C, O, S> RemoteApi for MockRemote<C, O, S>
where
    C: Resource + Sync,
    O: Send,
    S: StateLabel + Send,
{
    type Config = C;
    type Observed = O;
    type State = S;
    type Error = MockApiError;

    async fn put(&self, _config: &C) -> Result<(), MockApiError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.puts).unwrap_or(Ok(()))
    }

    async fn describe(&self, _id: &Identity) -> Result<Observation<O, S>, MockApiError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.describes).unwrap_or(Ok(Observation::Absent))
    }

    async fn delete(&self, _id: &Identity) -> Result<(), MockApiError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.deletes).unwrap_or(Ok(()))
    }
}

/// Assert that a retry, wait or lifecycle result ran out of time.
///
/// Works with any error type exposing `is_timeout()`.
///
/// # Example
///
/// ```rust
/// use slackwater::assert_timed_out;
/// use slackwater::retry::RetryError;
/// use std::time::Duration;
///
/// let result: Result<(), RetryError<&str>> = Err(RetryError::TimedOut {
///     last_error: "InsufficientPermissionsException",
///     attempts: 4,
///     elapsed: Duration::from_secs(2),
///     timeout: Duration::from_secs(2),
/// });
/// assert_timed_out!(result);
/// ```
#[macro_export]
macro_rules! assert_timed_out {
    ($result:expr) => {
        match $result {
            Err(e) if e.is_timeout() => {}
            Err(e) => panic!("Expected a timeout, got error: {:?}", e),
            Ok(v) => panic!("Expected a timeout, got Ok: {:?}", v),
        }
    };
}

/// Assert that a retry result failed fatally, optionally checking the error.
///
/// # Example
///
/// ```rust
/// use slackwater::assert_fatal;
/// use slackwater::retry::RetryError;
///
/// let result: Result<(), RetryError<&str>> = Err(RetryError::Fatal {
///     error: "ValidationException",
///     attempts: 1,
/// });
/// assert_fatal!(result, "ValidationException");
/// ```
#[macro_export]
macro_rules! assert_fatal {
    ($result:expr) => {
        match $result {
            Err($crate::retry::RetryError::Fatal { .. }) => {}
            other => panic!("Expected a fatal error, got: {:?}", other),
        }
    };
    ($result:expr, $expected:expr) => {
        match $result {
            Err($crate::retry::RetryError::Fatal { error, .. }) => assert_eq!(error, $expected),
            other => panic!("Expected a fatal error, got: {:?}", other),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::RawState;

    #[tokio::test]
    async fn test_scripts_replay_in_order_then_default() {
        let remote = MockRemote::<NamedConfig, u32, RawState>::new()
            .with_describe(Ok(Observation::present(RawState::new("ACTIVE"), 1)))
            .with_describe(Err(MockApiError::new("ThrottlingException")));
        let id = Identity::new("rule");

        assert_eq!(
            remote.describe(&id).await,
            Ok(Observation::present(RawState::new("ACTIVE"), 1))
        );
        assert_eq!(
            remote.describe(&id).await,
            Err(MockApiError::new("ThrottlingException"))
        );
        assert_eq!(remote.describe(&id).await, Ok(Observation::Absent));
        assert_eq!(remote.describe_calls(), 3);
    }

    #[tokio::test]
    async fn test_unscripted_calls_succeed() {
        let remote = MockRemote::<NamedConfig, (), RawState>::new();
        assert_eq!(remote.put(&NamedConfig::new("rule")).await, Ok(()));
        assert_eq!(remote.delete(&Identity::new("rule")).await, Ok(()));
        assert_eq!(remote.put_calls(), 1);
        assert_eq!(remote.delete_calls(), 1);
    }

    #[test]
    fn test_mock_error_codes() {
        let err = MockApiError::not_found("NoSuchConfigRuleException");
        assert!(err.is_not_found());
        assert_eq!(err.code(), "NoSuchConfigRuleException");
        assert!(!MockApiError::new("AccessDenied").is_not_found());
    }

    #[test]
    fn test_assert_timed_out_accepts_timeout() {
        let result: Result<(), crate::retry::RetryError<&str>> =
            Err(crate::retry::RetryError::TimedOut {
                last_error: "x",
                attempts: 2,
                elapsed: std::time::Duration::from_secs(1),
                timeout: std::time::Duration::from_secs(1),
            });
        assert_timed_out!(result);
    }

    #[test]
    #[should_panic(expected = "Expected a timeout")]
    fn test_assert_timed_out_rejects_ok() {
        let result: Result<u32, crate::retry::RetryError<&str>> = Ok(1);
        assert_timed_out!(result);
    }
}
