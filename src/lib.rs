//! # Slackwater
//!
//! > *Slack water: the still moment when the tide has finished turning.*
//!
//! A Rust library for converging eventually-consistent remote resources.
//!
//! ## Philosophy
//!
//! Remote control planes accept a change long before they finish applying
//! it, and sometimes reject a change only because an earlier one has not
//! propagated yet. **Slackwater** gives resource implementations three small,
//! bounded mechanisms for living with that:
//!
//! - [`timeout`]: per-operation timeouts a resource declares and callers may
//!   override, with strict validation of the override keys;
//! - [`retry`]: bounded retry of calls that fail transiently;
//! - [`poll`]: waiting for a resource to leave its pending states and reach
//!   a target state.
//!
//! [`lifecycle`] composes them into create, read, update and delete.
//!
//! ## Quick Example
//!
//! ```rust
//! use slackwater::prelude::*;
//! use slackwater::testing::{MockApiError, MockRemote, NamedConfig};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! // Declared once per resource kind: create and delete are tunable.
//! let policy = TimeoutPolicy::declare(
//!     TimeoutSpec::new()
//!         .with_create(Duration::from_secs(120))
//!         .with_delete(Duration::from_secs(300)),
//! );
//!
//! let remote = MockRemote::<NamedConfig, (), RawState>::new()
//!     .with_describe(Err(MockApiError::not_found("NoSuchConfigRuleException")));
//!
//! let controller = ResourceController::from_policy(
//!     remote,
//!     &policy,
//!     &TimeoutOverride::new().with("delete", "10m"),
//! )
//! .unwrap()
//! .with_transient_codes(TransientCodes::insufficient_permissions());
//!
//! let id = controller.create(&NamedConfig::new("required-tags")).await.unwrap();
//! controller
//!     .delete(&id, [RawState::new("ACTIVE"), RawState::new("DELETING")])
//!     .await
//!     .unwrap();
//! # });
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): emit `tracing` events from the retry loop, the
//!   poller and the controller.
//! - `jitter`: randomize backoff delays.
//! - `serde`: serialize [`timeout::TimeoutSpec`], [`timeout::Operation`] and
//!   [`lifecycle::Identity`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod lifecycle;
pub mod poll;
pub mod retry;
pub mod testing;
pub mod timeout;

// Re-exports
pub use lifecycle::{Identity, LifecycleError, ResourceController};
pub use poll::{wait_for_state, WaitError, WaitSpec};
pub use retry::{retry, retry_if, RetryError};
pub use timeout::{TimeoutConfigError, TimeoutPolicy, TimeoutSpec};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::lifecycle::{
        ApiError, Identity, LifecycleError, RemoteApi, Resource, ResourceController,
        TransientCodes,
    };
    pub use crate::poll::{wait_for_state, Observation, RawState, StateLabel, WaitError, WaitSpec};
    pub use crate::retry::{retry, retry_if, Attempt, BackoffPolicy, RetryError};
    pub use crate::timeout::{Operation, TimeoutOverride, TimeoutPolicy, TimeoutSpec};
}
