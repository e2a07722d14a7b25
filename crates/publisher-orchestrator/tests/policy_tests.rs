//! Tests for the failure policy table and engine settings

use publisher_orchestrator::settings::{
    ENV_BRANCH_PREFIX, ENV_CATALOG_TIMEOUT_SECS, ENV_CODEGEN_TIMEOUT_SECS, ENV_SETTLE_DELAY_MS,
};
use publisher_orchestrator::{
    BridgeRequestKind, FailureDecision, FailurePolicy, OrchestratorError, OrchestratorSettings,
    PolicyTable, RetryBackoff, StepKind, StepPolicy,
};
use rstest::rstest;
use serial_test::serial;
use std::collections::HashMap;
use std::time::Duration;

fn timeout_error() -> OrchestratorError {
    OrchestratorError::Timeout {
        kind: BridgeRequestKind::Commit,
        timeout_ms: 60_000,
    }
}

#[rstest]
#[case(StepKind::Generate, FailurePolicy::Fallback, 120)]
#[case(StepKind::PublishToCatalog, FailurePolicy::Halt, 30)]
#[case(StepKind::Commit, FailurePolicy::Halt, 60)]
#[case(StepKind::OpenPr, FailurePolicy::Halt, 60)]
#[case(StepKind::ConfigureDeploy, FailurePolicy::Halt, 60)]
fn test_default_policy_table(
    #[case] kind: StepKind,
    #[case] expected: FailurePolicy,
    #[case] timeout_secs: u64,
) {
    let table = PolicyTable::default();
    let policy = table.get(kind);
    assert_eq!(policy.on_failure, expected);
    assert_eq!(policy.timeout, Duration::from_secs(timeout_secs));
}

#[rstest]
#[case(FailurePolicy::Halt, FailureDecision::Halt)]
#[case(FailurePolicy::Fallback, FailureDecision::Fallback)]
fn test_delegate_failures_follow_policy(
    #[case] on_failure: FailurePolicy,
    #[case] decision: FailureDecision,
) {
    let policy = StepPolicy {
        on_failure,
        ..StepPolicy::halt(Duration::from_secs(1))
    };
    assert_eq!(policy.decide(1, &timeout_error()), decision);
}

#[test]
fn test_local_errors_always_halt() {
    let policy = StepPolicy::fallback(Duration::from_secs(1));
    let missing = OrchestratorError::missing_credentials("GitHub credentials missing");
    assert_eq!(policy.decide(1, &missing), FailureDecision::Halt);
    assert_eq!(
        policy.decide(1, &OrchestratorError::local("bad layout")),
        FailureDecision::Halt
    );
}

#[test]
fn test_retry_backs_off_then_halts() {
    let policy = StepPolicy::retry(3, Duration::from_secs(1)).with_backoff(RetryBackoff {
        base_delay_ms: 100,
        max_delay_ms: 150,
        multiplier: 2.0,
    });
    let error = OrchestratorError::DelegateFailure {
        kind: BridgeRequestKind::Commit,
        message: "rate limited".into(),
    };

    assert_eq!(
        policy.decide(1, &error),
        FailureDecision::Retry(Duration::from_millis(100))
    );
    assert_eq!(
        policy.decide(2, &error),
        FailureDecision::Retry(Duration::from_millis(150))
    );
    assert_eq!(policy.decide(3, &error), FailureDecision::Halt);
}

#[test]
fn test_table_overrides() {
    let table = PolicyTable::default()
        .with_policy(
            StepKind::Commit,
            StepPolicy::retry(2, Duration::from_secs(5)),
        )
        .with_timeout(StepKind::Generate, Duration::from_millis(50));

    assert_eq!(
        table.get(StepKind::Commit).on_failure,
        FailurePolicy::Retry { attempts: 2 }
    );
    let generate = table.get(StepKind::Generate);
    assert_eq!(generate.on_failure, FailurePolicy::Fallback);
    assert_eq!(generate.timeout, Duration::from_millis(50));
}

#[test]
fn test_settings_from_lookup() {
    let vars: HashMap<&str, &str> = HashMap::from([
        (ENV_SETTLE_DELAY_MS, "0"),
        (ENV_CODEGEN_TIMEOUT_SECS, " 5 "),
        (ENV_BRANCH_PREFIX, "design/"),
    ]);
    let settings =
        OrchestratorSettings::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(settings.settle_delay, Duration::ZERO);
    assert_eq!(settings.codegen_timeout, Duration::from_secs(5));
    assert_eq!(settings.external_timeout, Duration::from_secs(60));
    assert_eq!(settings.catalog_timeout, Duration::from_secs(30));
    assert_eq!(settings.branch_prefix, "design/");

    let table = PolicyTable::from_settings(&settings);
    assert_eq!(table.get(StepKind::Generate).timeout, Duration::from_secs(5));
}

#[test]
fn test_settings_reject_unparseable_value() {
    let err = OrchestratorSettings::from_lookup(|key| {
        (key == ENV_CATALOG_TIMEOUT_SECS).then(|| "soon".to_string())
    })
    .unwrap_err();
    assert!(matches!(err, OrchestratorError::Config(_)));
    assert!(err.to_string().contains(ENV_CATALOG_TIMEOUT_SECS));
}

#[test]
#[serial]
fn test_settings_from_env() {
    std::env::set_var(ENV_SETTLE_DELAY_MS, "25");
    std::env::set_var(ENV_BRANCH_PREFIX, "  ");

    let settings = OrchestratorSettings::from_env().unwrap();
    assert_eq!(settings.settle_delay, Duration::from_millis(25));
    assert_eq!(settings.branch_prefix, "feature/figma-components-");

    std::env::remove_var(ENV_SETTLE_DELAY_MS);
    std::env::remove_var(ENV_BRANCH_PREFIX);
}

#[test]
#[serial]
fn test_settings_defaults_without_env() {
    std::env::remove_var(ENV_SETTLE_DELAY_MS);
    let settings = OrchestratorSettings::from_env().unwrap();
    assert_eq!(settings.settle_delay, Duration::from_millis(800));
}
