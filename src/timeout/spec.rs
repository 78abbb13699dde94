//! The five-slot timeout structure.

use std::collections::BTreeMap;
use std::time::Duration;

use super::duration::DurationParseError;
use super::error::TimeoutConfigError;
use super::Operation;

/// Per-operation timeouts for one resource kind.
///
/// Each of the five slots is either unset or a positive duration. A
/// resource declares which operations accept a caller override by giving
/// that slot a value; after [`TimeoutPolicy::merge`](super::TimeoutPolicy::merge)
/// the same type carries the effective values.
///
/// `TimeoutSpec` is `Copy`, so every merge works on its own value and the
/// declaration shared by all instances of a resource kind is never touched.
///
/// # Examples
///
/// ```rust
/// use slackwater::timeout::{Operation, TimeoutSpec};
/// use std::time::Duration;
///
/// let spec = TimeoutSpec::new()
///     .with_create(Duration::from_secs(600))
///     .with_default(Duration::from_secs(300));
///
/// assert_eq!(spec.get(Operation::Delete), None);
/// assert_eq!(spec.effective(Operation::Delete), Some(Duration::from_secs(300)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeoutSpec {
    #[cfg_attr(feature = "serde", serde(default))]
    create: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(default))]
    read: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(default))]
    update: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(default))]
    delete: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(default))]
    default: Option<Duration>,
}

impl TimeoutSpec {
    /// A spec with every slot unset.
    pub const fn new() -> Self {
        Self {
            create: None,
            read: None,
            update: None,
            delete: None,
            default: None,
        }
    }

    /// Set the slot for `operation`. A zero duration clears the slot.
    pub const fn with(mut self, operation: Operation, timeout: Duration) -> Self {
        let slot = if timeout.is_zero() { None } else { Some(timeout) };
        match operation {
            Operation::Create => self.create = slot,
            Operation::Read => self.read = slot,
            Operation::Update => self.update = slot,
            Operation::Delete => self.delete = slot,
            Operation::Default => self.default = slot,
        }
        self
    }

    /// Set the `create` slot.
    pub const fn with_create(self, timeout: Duration) -> Self {
        self.with(Operation::Create, timeout)
    }

    /// Set the `read` slot.
    pub const fn with_read(self, timeout: Duration) -> Self {
        self.with(Operation::Read, timeout)
    }

    /// Set the `update` slot.
    pub const fn with_update(self, timeout: Duration) -> Self {
        self.with(Operation::Update, timeout)
    }

    /// Set the `delete` slot.
    pub const fn with_delete(self, timeout: Duration) -> Self {
        self.with(Operation::Delete, timeout)
    }

    /// Set the `default` slot.
    pub const fn with_default(self, timeout: Duration) -> Self {
        self.with(Operation::Default, timeout)
    }

    /// The raw value of a slot, without falling back to `default`.
    pub fn get(&self, operation: Operation) -> Option<Duration> {
        match operation {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
            Operation::Default => self.default,
        }
    }

    pub(crate) fn slot_mut(&mut self, operation: Operation) -> &mut Option<Duration> {
        match operation {
            Operation::Create => &mut self.create,
            Operation::Read => &mut self.read,
            Operation::Update => &mut self.update,
            Operation::Delete => &mut self.delete,
            Operation::Default => &mut self.default,
        }
    }

    /// The timeout that applies to `operation`: its own slot, or `default`.
    pub fn effective(&self, operation: Operation) -> Option<Duration> {
        self.get(operation).or(self.default)
    }

    /// Like [`effective`](Self::effective), with a final fallback.
    pub fn effective_or(&self, operation: Operation, fallback: Duration) -> Duration {
        self.effective(operation).unwrap_or(fallback)
    }

    /// Returns true if no slot is set.
    pub fn is_empty(&self) -> bool {
        Operation::ALL.iter().all(|op| self.get(*op).is_none())
    }

    /// Iterate over the set slots.
    pub fn iter(&self) -> impl Iterator<Item = (Operation, Duration)> + '_ {
        Operation::ALL
            .into_iter()
            .filter_map(|op| self.get(op).map(|d| (op, d)))
    }

    /// Encode the spec as instance metadata: operation key to nanoseconds.
    ///
    /// Returns `None` when no slot is set. When `default` is set, every
    /// operation without its own value is written out with the default, so
    /// a reader of the metadata never has to know the fallback rule.
    ///
    /// Durations parsed from configuration always fit. A slot set through
    /// the builders to more than `u64::MAX` nanoseconds is written as
    /// `u64::MAX` and decodes to that value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use slackwater::timeout::TimeoutSpec;
    /// use std::time::Duration;
    ///
    /// let spec = TimeoutSpec::new()
    ///     .with_create(Duration::from_secs(600))
    ///     .with_default(Duration::from_secs(420));
    ///
    /// let meta = spec.meta_encode().unwrap();
    /// assert_eq!(meta["create"], 600_000_000_000);
    /// assert_eq!(meta["read"], 420_000_000_000);
    /// assert_eq!(meta["default"], 420_000_000_000);
    /// ```
    pub fn meta_encode(&self) -> Option<BTreeMap<String, u64>> {
        if self.is_empty() {
            return None;
        }

        let meta = Operation::ALL
            .into_iter()
            .filter_map(|op| {
                let value = match self.default {
                    Some(_) => self.effective(op),
                    None => self.get(op),
                }?;
                let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
                Some((op.as_str().to_string(), nanos))
            })
            .collect();
        Some(meta)
    }

    /// Decode metadata written by [`meta_encode`](Self::meta_encode).
    pub fn meta_decode(meta: &BTreeMap<String, u64>) -> Result<Self, TimeoutConfigError> {
        meta.iter().try_fold(Self::new(), |spec, (key, nanos)| {
            let operation: Operation = key.parse()?;
            if *nanos == 0 {
                return Err(TimeoutConfigError::InvalidDurationFormat {
                    operation,
                    value: nanos.to_string(),
                    reason: DurationParseError::Zero,
                });
            }
            Ok(spec.with(operation, Duration::from_nanos(*nanos)))
        })
    }
}

#[cfg(test)]
mod spec_tests {
    use super::*;

    fn minutes(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }

    fn nanos_of_minutes(n: u64) -> u64 {
        n * 60 * 1_000_000_000
    }

    #[test]
    fn test_builder_sets_only_named_slots() {
        let spec = TimeoutSpec::new()
            .with_create(minutes(10))
            .with_update(minutes(5));

        assert_eq!(spec.get(Operation::Create), Some(minutes(10)));
        assert_eq!(spec.get(Operation::Update), Some(minutes(5)));
        assert_eq!(spec.get(Operation::Read), None);
        assert_eq!(spec.get(Operation::Delete), None);
        assert_eq!(spec.get(Operation::Default), None);
    }

    #[test]
    fn test_zero_duration_clears_slot() {
        let spec = TimeoutSpec::new()
            .with_create(minutes(10))
            .with_create(Duration::ZERO);
        assert!(spec.is_empty());
    }

    #[test]
    fn test_effective_falls_back_to_default() {
        let spec = TimeoutSpec::new()
            .with_create(minutes(10))
            .with_default(minutes(7));

        assert_eq!(spec.effective(Operation::Create), Some(minutes(10)));
        assert_eq!(spec.effective(Operation::Delete), Some(minutes(7)));
        assert_eq!(
            TimeoutSpec::new().effective_or(Operation::Read, minutes(20)),
            minutes(20)
        );
    }

    #[test]
    fn test_iter_yields_set_slots_in_order() {
        let spec = TimeoutSpec::new()
            .with_delete(minutes(3))
            .with_create(minutes(1));
        let slots: Vec<_> = spec.iter().collect();
        assert_eq!(
            slots,
            vec![(Operation::Create, minutes(1)), (Operation::Delete, minutes(3))]
        );
    }

    #[test]
    fn test_meta_encode_two_fields() {
        let spec = TimeoutSpec::new()
            .with_create(minutes(10))
            .with_update(minutes(5));

        let expected: BTreeMap<String, u64> = [
            ("create".to_string(), nanos_of_minutes(10)),
            ("update".to_string(), nanos_of_minutes(5)),
        ]
        .into_iter()
        .collect();
        assert_eq!(spec.meta_encode(), Some(expected));
    }

    #[test]
    fn test_meta_encode_spreads_default() {
        let spec = TimeoutSpec::new()
            .with_create(minutes(10))
            .with_default(minutes(7));

        let expected: BTreeMap<String, u64> = [
            ("create".to_string(), nanos_of_minutes(10)),
            ("read".to_string(), nanos_of_minutes(7)),
            ("update".to_string(), nanos_of_minutes(7)),
            ("delete".to_string(), nanos_of_minutes(7)),
            ("default".to_string(), nanos_of_minutes(7)),
        ]
        .into_iter()
        .collect();
        assert_eq!(spec.meta_encode(), Some(expected));
    }

    #[test]
    fn test_meta_encode_empty_is_none() {
        assert_eq!(TimeoutSpec::new().meta_encode(), None);
    }

    #[test]
    fn test_meta_decode_reads_back() {
        let spec = TimeoutSpec::new()
            .with_create(minutes(10))
            .with_update(minutes(5));
        let meta = spec.meta_encode().unwrap();
        assert_eq!(TimeoutSpec::meta_decode(&meta), Ok(spec));
    }

    #[test]
    fn test_meta_decode_rejects_unknown_key_and_zero() {
        let unknown: BTreeMap<String, u64> = [("destroy".to_string(), 1)].into_iter().collect();
        assert!(matches!(
            TimeoutSpec::meta_decode(&unknown),
            Err(TimeoutConfigError::UnsupportedTimeoutKey { key }) if key == "destroy"
        ));

        let zero: BTreeMap<String, u64> = [("read".to_string(), 0)].into_iter().collect();
        assert!(matches!(
            TimeoutSpec::meta_decode(&zero),
            Err(TimeoutConfigError::InvalidDurationFormat {
                operation: Operation::Read,
                ..
            })
        ));
    }

    #[test]
    fn test_meta_encode_saturates_oversized_slots() {
        let spec = TimeoutSpec::new().with_delete(Duration::MAX);

        let meta = spec.meta_encode().unwrap();
        assert_eq!(meta["delete"], u64::MAX);
        assert_eq!(
            TimeoutSpec::meta_decode(&meta).unwrap().get(Operation::Delete),
            Some(Duration::from_nanos(u64::MAX))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip_keeps_unset_slots() {
        let spec = TimeoutSpec::new().with_delete(minutes(5));

        let json = serde_json::to_string(&spec).unwrap();
        let restored: TimeoutSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, spec);

        let sparse: TimeoutSpec =
            serde_json::from_str(r#"{"create":{"secs":60,"nanos":0}}"#).unwrap();
        assert_eq!(sparse, TimeoutSpec::new().with_create(minutes(1)));
        assert_eq!(
            serde_json::to_string(&Operation::Delete).unwrap(),
            r#""delete""#
        );
    }
}
