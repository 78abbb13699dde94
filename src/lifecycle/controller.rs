//! Create, read, update and delete against an eventually-consistent remote.

use std::time::Duration;

use crate::poll::{wait_for_state, Observation, WaitSpec};
use crate::retry::{retry_if_with_policy, BackoffPolicy};
use crate::timeout::{Operation, TimeoutConfigError, TimeoutOverride, TimeoutPolicy, TimeoutSpec};

use super::api::{ApiError, RemoteApi, TransientCodes};
use super::error::LifecycleError;
use super::{Identity, LifecycleState, Resource};

/// Timeout used for an operation when neither its own slot nor `default` is set.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(20 * 60);

type ControllerError<A> = LifecycleError<<A as RemoteApi>::Error, <A as RemoteApi>::State>;

/// Drives one kind of remote resource through its lifecycle.
///
/// The controller holds no per-resource state. Callers persist the
/// [`Identity`] returned by [`create`](Self::create) and pass it back in.
///
/// # Example
///
/// ```rust
/// use slackwater::lifecycle::{ResourceController, TransientCodes};
/// use slackwater::poll::RawState;
/// use slackwater::testing::{MockApiError, MockRemote, NamedConfig};
/// use slackwater::timeout::TimeoutSpec;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let remote = MockRemote::<NamedConfig, (), RawState>::new()
///     .with_put(Err(MockApiError::new("InsufficientPermissionsException")));
///
/// let controller = ResourceController::new(
///     remote,
///     TimeoutSpec::new().with_create(Duration::from_secs(120)),
/// )
/// .with_transient_codes(TransientCodes::insufficient_permissions())
/// .with_backoff(slackwater::retry::BackoffPolicy::constant(Duration::from_millis(1)));
///
/// let id = controller.create(&NamedConfig::new("rule-1")).await.unwrap();
/// assert_eq!(id.as_str(), "rule-1");
/// assert_eq!(controller.api().put_calls(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct ResourceController<A> {
    api: A,
    timeouts: TimeoutSpec,
    transient: TransientCodes,
    backoff: BackoffPolicy,
    min_poll_interval: Duration,
    max_poll_interval: Duration,
}

impl<A: RemoteApi> ResourceController<A> {
    /// A controller using already-merged timeouts.
    ///
    /// Every failure is fatal until transient codes are configured with
    /// [`with_transient_codes`](Self::with_transient_codes).
    pub fn new(api: A, timeouts: TimeoutSpec) -> Self {
        Self {
            api,
            timeouts,
            transient: TransientCodes::none(),
            backoff: BackoffPolicy::default(),
            min_poll_interval: Duration::from_millis(100),
            max_poll_interval: Duration::from_secs(10),
        }
    }

    /// A controller whose timeouts are a resource kind's declaration merged
    /// with caller overrides.
    pub fn from_policy(
        api: A,
        policy: &TimeoutPolicy,
        overrides: &TimeoutOverride,
    ) -> Result<Self, TimeoutConfigError> {
        Ok(Self::new(api, policy.merge(overrides)?))
    }

    /// Error codes to retry during create and update.
    pub fn with_transient_codes(mut self, codes: TransientCodes) -> Self {
        self.transient = codes;
        self
    }

    /// Backoff between create/update attempts.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Bounds of the sleep between probes while waiting for deletion.
    pub fn with_poll_interval(mut self, min: Duration, max: Duration) -> Self {
        self.min_poll_interval = min;
        self.max_poll_interval = max;
        self
    }

    /// The remote API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The effective timeouts.
    pub fn timeouts(&self) -> &TimeoutSpec {
        &self.timeouts
    }

    /// The time budget for `operation`.
    pub fn timeout_for(&self, operation: Operation) -> Duration {
        self.timeouts
            .effective_or(operation, DEFAULT_OPERATION_TIMEOUT)
    }

    /// Create the resource, retrying transient failures within the
    /// `create` timeout. The identity is the desired configuration's name.
    pub async fn create(&self, desired: &A::Config) -> Result<Identity, ControllerError<A>> {
        self.upsert(LifecycleState::Creating, Operation::Create, desired)
            .await
    }

    /// Update the resource in place, retrying transient failures within the
    /// `update` timeout.
    pub async fn update(&self, desired: &A::Config) -> Result<Identity, ControllerError<A>> {
        self.upsert(LifecycleState::Updating, Operation::Update, desired)
            .await
    }

    async fn upsert(
        &self,
        transition: LifecycleState,
        operation: Operation,
        desired: &A::Config,
    ) -> Result<Identity, ControllerError<A>> {
        let timeout = self.timeout_for(operation);
        let name = desired.name();

        #[cfg(feature = "tracing")]
        tracing::debug!(resource = name, state = %transition, ?timeout, "putting resource");
        #[cfg(not(feature = "tracing"))]
        let _ = transition;

        let api = &self.api;
        let transient = &self.transient;
        retry_if_with_policy(
            &self.backoff,
            timeout,
            move || api.put(desired),
            |error| transient.is_transient(error),
        )
        .await?;

        #[cfg(feature = "tracing")]
        tracing::info!(resource = name, state = %LifecycleState::Present, "resource converged");

        Ok(Identity::new(name))
    }

    /// Read the resource.
    ///
    /// Returns `Ok(None)` when the resource no longer exists, whether the
    /// remote reports that as an empty result or as a not-found error. The
    /// caller should then forget the identity.
    pub async fn read(&self, id: &Identity) -> Result<Option<A::Observed>, ControllerError<A>> {
        match self.api.describe(id).await {
            Ok(Observation::Present { payload, .. }) => Ok(Some(payload)),
            Ok(Observation::Absent) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(resource = %id, "resource is gone");
                Ok(None)
            }
            Err(error) if error.is_not_found() => {
                #[cfg(feature = "tracing")]
                tracing::warn!(resource = %id, code = error.code(), "resource is gone");
                Ok(None)
            }
            Err(error) => Err(LifecycleError::Api(error)),
        }
    }

    /// Delete the resource and wait until it is gone.
    ///
    /// The delete call is issued once and any failure of it is fatal. The
    /// controller then probes the resource within the `delete` timeout
    /// while it reports one of `pending`, until it can no longer be read.
    pub async fn delete(
        &self,
        id: &Identity,
        pending: impl IntoIterator<Item = A::State>,
    ) -> Result<(), ControllerError<A>> {
        #[cfg(feature = "tracing")]
        tracing::debug!(resource = %id, state = %LifecycleState::Deleting, "deleting resource");

        self.api.delete(id).await.map_err(LifecycleError::Api)?;

        let spec = WaitSpec::until_absent(pending, self.timeout_for(Operation::Delete))
            .with_poll_interval(self.min_poll_interval, self.max_poll_interval);

        let api = &self.api;
        wait_for_state(&spec, move || async move {
            match api.describe(id).await {
                Err(error) if error.is_not_found() => Ok(Observation::Absent),
                other => other,
            }
        })
        .await?;

        #[cfg(feature = "tracing")]
        tracing::info!(resource = %id, state = %LifecycleState::Absent, "resource deleted");

        Ok(())
    }
}
