//! Declared timeouts and caller overrides.

use super::duration::parse_positive_duration;
use super::error::TimeoutConfigError;
use super::spec::TimeoutSpec;
use super::Operation;

/// Caller-supplied timeout overrides, as read from resource configuration.
///
/// Entries are raw `(key, duration)` strings; nothing is validated until
/// [`TimeoutPolicy::merge`]. If the same key appears twice, the last entry
/// wins.
///
/// # Examples
///
/// ```rust
/// use slackwater::timeout::TimeoutOverride;
///
/// let overrides = TimeoutOverride::new()
///     .with("create", "2m")
///     .with("update", "1m");
/// assert_eq!(overrides.len(), 2);
///
/// let collected: TimeoutOverride = [("delete", "30s")].into_iter().collect();
/// assert!(!collected.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeoutOverride {
    entries: Vec<(String, String)>,
}

impl TimeoutOverride {
    /// An empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Add an entry in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for TimeoutOverride
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for TimeoutOverride
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.push(k, v);
        }
    }
}

/// The timeouts a resource kind declares, and which of them callers may tune.
///
/// An operation is overridable exactly when the declaration gives it a
/// default. Declarations are meant to be built once per resource kind and
/// shared; [`merge`](Self::merge) takes `&self` and returns a new spec.
///
/// # Examples
///
/// ```rust
/// use slackwater::timeout::{Operation, TimeoutOverride, TimeoutPolicy, TimeoutSpec};
/// use std::time::Duration;
///
/// let policy = TimeoutPolicy::declare(
///     TimeoutSpec::new()
///         .with_create(Duration::from_secs(600))
///         .with_update(Duration::from_secs(300)),
/// );
///
/// let merged = policy
///     .merge(&TimeoutOverride::new().with("create", "2m"))
///     .unwrap();
/// assert_eq!(merged.get(Operation::Create), Some(Duration::from_secs(120)));
/// assert_eq!(merged.get(Operation::Update), Some(Duration::from_secs(300)));
///
/// // Delete was never declared, so it cannot be overridden.
/// assert!(policy.merge(&TimeoutOverride::new().with("delete", "1m")).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeoutPolicy {
    declared: TimeoutSpec,
}

impl TimeoutPolicy {
    /// Declare the default timeouts of a resource kind.
    pub const fn declare(defaults: TimeoutSpec) -> Self {
        Self { declared: defaults }
    }

    /// A copy of the declared defaults.
    pub fn declared(&self) -> TimeoutSpec {
        self.declared
    }

    /// Returns true if callers may override the timeout of `operation`.
    pub fn supports(&self, operation: Operation) -> bool {
        self.declared.get(operation).is_some()
    }

    /// Apply caller overrides on top of the declared defaults.
    ///
    /// Every entry must name one of the five operations, the operation must
    /// have a declared default, and the value must be a positive duration.
    /// The first entry that fails aborts the merge; no partially merged spec
    /// is ever returned.
    pub fn merge(&self, overrides: &TimeoutOverride) -> Result<TimeoutSpec, TimeoutConfigError> {
        let mut merged = self.declared;

        for (key, value) in overrides.iter() {
            apply_override(&mut merged, key, value).inspect_err(|_err| {
                #[cfg(feature = "tracing")]
                tracing::warn!(key, value, error = %_err, "rejected timeout override");
            })?;
        }

        Ok(merged)
    }
}

impl From<TimeoutSpec> for TimeoutPolicy {
    fn from(defaults: TimeoutSpec) -> Self {
        Self::declare(defaults)
    }
}

fn apply_override(
    spec: &mut TimeoutSpec,
    key: &str,
    value: &str,
) -> Result<(), TimeoutConfigError> {
    let operation: Operation = key.parse()?;

    let slot = spec.slot_mut(operation);
    if slot.is_none() {
        return Err(TimeoutConfigError::TimeoutNotDeclared { operation });
    }

    let timeout =
        parse_positive_duration(value).map_err(|reason| TimeoutConfigError::InvalidDurationFormat {
            operation,
            value: value.to_string(),
            reason,
        })?;

    #[cfg(feature = "tracing")]
    tracing::debug!(%operation, ?timeout, "applied timeout override");

    *slot = Some(timeout);
    Ok(())
}
