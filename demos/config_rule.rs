//! Config Rule Example
//!
//! Demonstrates driving a compliance rule through its lifecycle against a
//! control plane that is slow to honour a freshly granted role and slow to
//! finish deleting.
//!
//! Run with: cargo run --example config_rule

use slackwater::poll::RawState;
use slackwater::TimeoutConfigError;
use slackwater::prelude::*;
use slackwater::testing::{MockApiError, MockRemote, NamedConfig};
use std::time::Duration;

static RULE_TIMEOUTS: TimeoutPolicy = TimeoutPolicy::declare(
    TimeoutSpec::new()
        .with_create(Duration::from_secs(120))
        .with_update(Duration::from_secs(120))
        .with_delete(Duration::from_secs(300)),
);

const DELETION_PENDING: [&str; 4] = ["ACTIVE", "DELETING", "DELETING_RESULTS", "EVALUATING"];

type Remote = MockRemote<NamedConfig, String, RawState>;

fn scripted_remote() -> Remote {
    Remote::new()
        .with_put(Err(MockApiError::new(TransientCodes::INSUFFICIENT_PERMISSIONS)))
        .with_put(Err(MockApiError::new(TransientCodes::INSUFFICIENT_PERMISSIONS)))
        .with_describe(Ok(Observation::present(
            RawState::new("ACTIVE"),
            "arn:aws:config:us-east-1:123456789012:config-rule/required-tags".to_string(),
        )))
        .with_describe(Ok(Observation::present(
            RawState::new("DELETING"),
            String::new(),
        )))
        .with_describe(Ok(Observation::present(
            RawState::new("DELETING_RESULTS"),
            String::new(),
        )))
        .with_describe(Err(MockApiError::not_found("NoSuchConfigRuleException")))
}

// ==================== Timeouts ====================

fn timeouts() -> Result<(), TimeoutConfigError> {
    println!("\n=== Timeouts ===\n");

    let merged = RULE_TIMEOUTS.merge(&TimeoutOverride::new().with("delete", "10m"))?;
    for (operation, timeout) in merged.iter() {
        println!("{:>7}: {:?}", operation, timeout);
    }

    for bad in [("read", "1m"), ("delte", "1m"), ("create", "soon")] {
        let result = RULE_TIMEOUTS.merge(&TimeoutOverride::new().with(bad.0, bad.1));
        if let Err(err) = result {
            println!("rejected {:?}: {}", bad, err);
        }
    }

    Ok(())
}

// ==================== Lifecycle ====================

async fn lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n=== Lifecycle ===\n");

    let controller = ResourceController::from_policy(
        scripted_remote(),
        &RULE_TIMEOUTS,
        &TimeoutOverride::new().with("delete", "10m"),
    )?
    .with_transient_codes(TransientCodes::insufficient_permissions())
    .with_backoff(BackoffPolicy::constant(Duration::from_millis(200)))
    .with_poll_interval(Duration::from_millis(100), Duration::from_millis(400));

    let id = controller.create(&NamedConfig::new("required-tags")).await?;
    println!(
        "created {} after {} put calls",
        id,
        controller.api().put_calls()
    );

    if let Some(arn) = controller.read(&id).await? {
        println!("read back {}", arn);
    }

    controller
        .delete(&id, DELETION_PENDING.map(RawState::new))
        .await?;
    println!(
        "deleted {} after {} probes",
        id,
        controller.api().describe_calls() - 1
    );

    match controller.read(&id).await? {
        None => println!("{} is gone", id),
        Some(arn) => println!("{} still exists as {}", id, arn),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Slackwater Config Rule Example");
    println!("==============================");

    timeouts()?;
    lifecycle().await?;

    Ok(())
}
