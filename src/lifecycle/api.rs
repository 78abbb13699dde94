//! The contract a remote control-plane client fulfils.

use std::fmt;
use std::future::Future;

use crate::poll::{Observation, StateLabel};

use super::{Identity, Resource};

/// An error reported by a remote API.
///
/// Remote errors carry a stable machine-readable code. The controller uses
/// it to tell transient failures (see [`TransientCodes`]) from fatal ones,
/// and relies on [`is_not_found`](Self::is_not_found) to recognize a
/// resource that no longer exists.
pub trait ApiError: fmt::Display + fmt::Debug {
    /// The machine-readable error code, e.g. `"NoSuchConfigRuleException"`.
    fn code(&self) -> &str;

    /// Returns true if the error means the resource does not exist.
    fn is_not_found(&self) -> bool;
}

/// A remote API managing one kind of resource.
///
/// Implementations translate between the desired configuration and the
/// remote's request and response shapes. `put` must be idempotent: the
/// controller may call it several times for one change.
pub trait RemoteApi: Send + Sync {
    /// The desired configuration of a resource.
    type Config: Resource + Sync;
    /// What a describe call reads back.
    type Observed: Send;
    /// The remote's state machine.
    type State: StateLabel + Send;
    /// Errors reported by the remote.
    type Error: ApiError + Send;

    /// Create the resource, or update it in place if it exists.
    fn put(&self, config: &Self::Config) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Read the resource.
    ///
    /// An empty result is [`Observation::Absent`]; a remote that reports
    /// missing resources as errors returns an error whose
    /// [`ApiError::is_not_found`] is true instead.
    fn describe(
        &self,
        id: &Identity,
    ) -> impl Future<Output = Result<Observation<Self::Observed, Self::State>, Self::Error>> + Send;

    /// Request deletion of the resource.
    fn delete(&self, id: &Identity) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Error codes that mark a failed call as transient.
///
/// The canonical case is an authorization failure right after a role or
/// policy was granted: the identity system propagates grants
/// asynchronously, so the same call succeeds a few seconds later.
///
/// # Examples
///
/// ```rust
/// use slackwater::lifecycle::TransientCodes;
///
/// let codes = TransientCodes::insufficient_permissions().with("ThrottlingException");
/// assert!(codes.contains("InsufficientPermissionsException"));
/// assert!(codes.contains("ThrottlingException"));
/// assert!(!codes.contains("ValidationException"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientCodes {
    codes: Vec<String>,
}

impl TransientCodes {
    /// Code reported while a permission grant is still propagating.
    pub const INSUFFICIENT_PERMISSIONS: &'static str = "InsufficientPermissionsException";

    /// No code is transient; every failure is fatal.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only [`INSUFFICIENT_PERMISSIONS`](Self::INSUFFICIENT_PERMISSIONS) is transient.
    pub fn insufficient_permissions() -> Self {
        Self::none().with(Self::INSUFFICIENT_PERMISSIONS)
    }

    /// Add a transient code.
    pub fn with(mut self, code: impl Into<String>) -> Self {
        self.codes.push(code.into());
        self
    }

    /// Returns true if `code` is transient.
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// Classify an API error.
    pub fn is_transient<E: ApiError>(&self, error: &E) -> bool {
        self.contains(error.code())
    }
}

impl<S: Into<String>> FromIterator<S> for TransientCodes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().map(Into::into).collect(),
        }
    }
}
