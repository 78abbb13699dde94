//! Per-operation timeouts with declared defaults and validated overrides.
//!
//! A resource kind declares a [`TimeoutSpec`] naming the operations whose
//! timeout callers may tune. The presence of a default is the capability
//! flag: an operation with no declared default cannot be overridden, and
//! trying to is a configuration error rather than something silently
//! ignored.
//!
//! ```rust
//! use slackwater::timeout::{Operation, TimeoutConfigError, TimeoutOverride, TimeoutPolicy, TimeoutSpec};
//! use std::time::Duration;
//!
//! static RULE_TIMEOUTS: TimeoutPolicy = TimeoutPolicy::declare(
//!     TimeoutSpec::new().with_delete(Duration::from_secs(300)),
//! );
//!
//! let merged = RULE_TIMEOUTS
//!     .merge(&TimeoutOverride::new().with("delete", "10m"))
//!     .unwrap();
//! assert_eq!(merged.get(Operation::Delete), Some(Duration::from_secs(600)));
//!
//! let err = RULE_TIMEOUTS
//!     .merge(&TimeoutOverride::new().with("create", "10m"))
//!     .unwrap_err();
//! assert_eq!(err, TimeoutConfigError::TimeoutNotDeclared { operation: Operation::Create });
//! ```

mod duration;
mod error;
mod policy;
mod spec;

use std::fmt;
use std::str::FromStr;

pub use duration::{parse_duration, DurationParseError};
pub use error::TimeoutConfigError;
pub use policy::{TimeoutOverride, TimeoutPolicy};
pub use spec::TimeoutSpec;

/// A logical resource operation that can carry its own timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Operation {
    /// Creating the resource.
    Create,
    /// Reading the resource.
    Read,
    /// Updating the resource in place.
    Update,
    /// Deleting the resource.
    Delete,
    /// Fallback for operations without their own timeout.
    Default,
}

impl Operation {
    /// Every operation, in slot order.
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
        Operation::Default,
    ];

    /// The configuration key for this operation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Default => "default",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = TimeoutConfigError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == key)
            .ok_or_else(|| TimeoutConfigError::UnsupportedTimeoutKey {
                key: key.to_string(),
            })
    }
}
