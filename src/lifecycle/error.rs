//! Errors surfaced by the resource controller.

use std::fmt;

use crate::poll::{StateLabel, WaitError};
use crate::retry::RetryError;

/// Error returned by [`ResourceController`](super::ResourceController).
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleError<E, S> {
    /// A remote call failed and was not retried.
    Api(E),
    /// Creating or updating failed fatally, or kept failing transiently
    /// until the timeout.
    Retry(RetryError<E>),
    /// The resource did not converge after the remote call was accepted.
    Wait(WaitError<S, E>),
}

impl<E, S> LifecycleError<E, S> {
    /// Returns true if an elapsed-time budget ran out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Api(_) => false,
            Self::Retry(e) => e.is_timeout(),
            Self::Wait(e) => e.is_timeout(),
        }
    }

    /// The remote error behind this failure, if there is one.
    pub fn api_error(&self) -> Option<&E> {
        match self {
            Self::Api(e) | Self::Wait(WaitError::Refresh(e)) => Some(e),
            Self::Retry(e) => Some(e.inner()),
            Self::Wait(_) => None,
        }
    }
}

impl<E: fmt::Display, S: StateLabel> fmt::Display for LifecycleError<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "remote call failed: {}", e),
            Self::Retry(e) => write!(f, "{}", e),
            Self::Wait(e) => write!(f, "{}", e),
        }
    }
}

impl<E, S> std::error::Error for LifecycleError<E, S>
where
    E: std::error::Error + 'static,
    S: StateLabel + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Retry(e) => Some(e),
            Self::Wait(e) => Some(e),
        }
    }
}

impl<E, S> From<RetryError<E>> for LifecycleError<E, S> {
    fn from(e: RetryError<E>) -> Self {
        Self::Retry(e)
    }
}

impl<E, S> From<WaitError<S, E>> for LifecycleError<E, S> {
    fn from(e: WaitError<S, E>) -> Self {
        Self::Wait(e)
    }
}
