//! Property-based tests for timeout declarations and overrides

use proptest::prelude::*;
use slackwater::timeout::{
    parse_duration, Operation, TimeoutConfigError, TimeoutOverride, TimeoutPolicy, TimeoutSpec,
};
use std::time::Duration;

const KEYS: [&str; 5] = ["create", "read", "update", "delete", "default"];

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

fn arb_spec() -> impl Strategy<Value = TimeoutSpec> {
    prop::collection::vec(prop::option::of(1u64..100_000), 5).prop_map(|slots| {
        Operation::ALL
            .into_iter()
            .zip(slots)
            .fold(TimeoutSpec::new(), |spec, (op, secs)| match secs {
                Some(secs) => spec.with(op, Duration::from_secs(secs)),
                None => spec,
            })
    })
}

fn arb_override() -> impl Strategy<Value = TimeoutOverride> {
    prop::collection::vec(
        (
            prop_oneof![
                prop::sample::select(KEYS.to_vec()).prop_map(String::from),
                "[a-z]{1,8}",
            ],
            prop_oneof![
                (1u32..10_000).prop_map(|n| format!("{}s", n)),
                (1u32..1_000).prop_map(|n| format!("{}m", n)),
                "[a-z0-9 ]{0,6}",
            ],
        ),
        0..6,
    )
    .prop_map(|entries| entries.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_unknown_keys_always_rejected(
        spec in arb_spec(),
        key in "[a-zA-Z_]{1,12}",
    ) {
        prop_assume!(!KEYS.contains(&key.as_str()));
        let policy = TimeoutPolicy::declare(spec);

        let result = policy.merge(&TimeoutOverride::new().with(key.clone(), "1m"));

        prop_assert_eq!(result, Err(TimeoutConfigError::UnsupportedTimeoutKey { key }));
    }

    #[test]
    fn prop_undeclared_operation_always_rejected(
        spec in arb_spec(),
        op in arb_operation(),
        minutes in 1u32..600,
    ) {
        let declared = TimeoutSpec::new()
            .with_create(spec.get(Operation::Create).unwrap_or(Duration::from_secs(1)));
        let spec = if op == Operation::Create { TimeoutSpec::new() } else { declared };
        let policy = TimeoutPolicy::declare(spec);

        let result = policy.merge(&TimeoutOverride::new().with(op.as_str(), format!("{}m", minutes)));

        prop_assert_eq!(result, Err(TimeoutConfigError::TimeoutNotDeclared { operation: op }));
    }

    #[test]
    fn prop_merge_never_mutates_declaration(
        spec in arb_spec(),
        overrides in arb_override(),
    ) {
        let policy = TimeoutPolicy::declare(spec);
        let before = policy.declared();

        let _ = policy.merge(&overrides);

        prop_assert_eq!(policy.declared(), before);
        prop_assert_eq!(before, spec);
    }

    #[test]
    fn prop_successful_merge_only_touches_declared_slots(
        spec in arb_spec(),
        overrides in arb_override(),
    ) {
        let policy = TimeoutPolicy::declare(spec);

        if let Ok(merged) = policy.merge(&overrides) {
            for op in Operation::ALL {
                prop_assert_eq!(merged.get(op).is_some(), spec.get(op).is_some());
            }
        }
    }

    #[test]
    fn prop_valid_overrides_applied(
        spec in arb_spec(),
        op in arb_operation(),
        secs in 1u64..100_000,
    ) {
        let spec = spec.with(op, Duration::from_secs(60));
        let policy = TimeoutPolicy::declare(spec);

        let merged = policy
            .merge(&TimeoutOverride::new().with(op.as_str(), format!("{}s", secs)))
            .unwrap();

        prop_assert_eq!(merged.get(op), Some(Duration::from_secs(secs)));
        for other in Operation::ALL.into_iter().filter(|o| *o != op) {
            prop_assert_eq!(merged.get(other), spec.get(other));
        }
    }

    #[test]
    fn prop_compound_durations_sum(h in 0u64..100, m in 0u64..60, s in 0u64..60) {
        let text = format!("{}h{}m{}s", h, m, s);
        prop_assert_eq!(
            parse_duration(&text),
            Ok(Duration::from_secs(h * 3600 + m * 60 + s))
        );
    }
}
