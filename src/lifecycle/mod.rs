//! Resource lifecycle against a remote control plane.
//!
//! A [`ResourceController`] composes the other modules: create and update
//! wrap a single idempotent put call in [`retry`](crate::retry), delete
//! issues one delete call and then [waits](crate::poll) for the resource to
//! disappear, and read maps a missing resource to `None`. Timeouts come
//! from a merged [`TimeoutSpec`](crate::timeout::TimeoutSpec).
//!
//! ```text
//! Absent -> Creating -> Present -> Updating -> Present -> Deleting -> Absent
//! ```
//!
//! `Present` is the only state observable between calls; the others last
//! for the duration of one controller call.

mod api;
mod controller;
mod error;

use std::fmt;

pub use api::{ApiError, RemoteApi, TransientCodes};
pub use controller::{ResourceController, DEFAULT_OPERATION_TIMEOUT};
pub use error::LifecycleError;

/// A desired resource configuration.
pub trait Resource {
    /// The caller-chosen name that identifies the resource remotely.
    fn name(&self) -> &str;
}

/// The identity of a resource that exists remotely.
///
/// Assigned by the controller after a successful create, from the desired
/// configuration's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Identity(String);

impl Identity {
    /// Wrap a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the name.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Where a resource is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// The resource does not exist.
    Absent,
    /// A create call is in flight.
    Creating,
    /// The resource exists and matches the last applied configuration.
    Present,
    /// An update call is in flight.
    Updating,
    /// A delete was issued and the resource has not disappeared yet.
    Deleting,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Absent => "absent",
            Self::Creating => "creating",
            Self::Present => "present",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
        };
        f.write_str(name)
    }
}
