//! Failure Policy Table
//!
//! Each step declares what happens when its delegated call fails or times
//! out: halt the run, substitute a locally computed fallback, or retry with
//! exponential backoff. The table is plain data so it can be checked without
//! running a pipeline.

use crate::error::OrchestratorError;
use crate::settings::OrchestratorSettings;
use publisher_types::StepKind;
use std::collections::HashMap;
use std::time::Duration;

/// Reaction to a failed delegated call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Mark the step as failed and stop the run
    Halt,
    /// Use the locally computed substitute
    Fallback,
    /// Try again, up to `attempts` calls in total, then halt
    Retry { attempts: usize },
}

/// Decision for one failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    Retry(Duration),
    Fallback,
    Halt,
}

/// Backoff bounds for `FailurePolicy::Retry`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryBackoff {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 10000,
            multiplier: 2.0,
        }
    }
}

impl RetryBackoff {
    /// Delay before the call following `attempt` (1-based)
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = (self.base_delay_ms as f64 * self.multiplier.powi(exponent)).round() as u64;
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

/// Policy and bounded wait for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPolicy {
    pub on_failure: FailurePolicy,
    pub timeout: Duration,
    pub backoff: RetryBackoff,
}

impl StepPolicy {
    pub fn halt(timeout: Duration) -> Self {
        Self {
            on_failure: FailurePolicy::Halt,
            timeout,
            backoff: RetryBackoff::default(),
        }
    }

    pub fn fallback(timeout: Duration) -> Self {
        Self {
            on_failure: FailurePolicy::Fallback,
            ..Self::halt(timeout)
        }
    }

    pub fn retry(attempts: usize, timeout: Duration) -> Self {
        Self {
            on_failure: FailurePolicy::Retry { attempts },
            ..Self::halt(timeout)
        }
    }

    pub fn with_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Decide what to do after `attempt` (1-based) failed with `error`
    ///
    /// Only delegate outcomes (explicit failure, timeout, malformed result)
    /// are absorbable; anything else always halts.
    pub fn decide(&self, attempt: usize, error: &OrchestratorError) -> FailureDecision {
        if !error.is_delegate_outcome() {
            return FailureDecision::Halt;
        }
        match self.on_failure {
            FailurePolicy::Halt => FailureDecision::Halt,
            FailurePolicy::Fallback => FailureDecision::Fallback,
            FailurePolicy::Retry { attempts } if attempt < attempts => {
                FailureDecision::Retry(self.backoff.delay_for(attempt))
            }
            FailurePolicy::Retry { .. } => FailureDecision::Halt,
        }
    }
}

/// Per-step policies for a run
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: HashMap<StepKind, StepPolicy>,
    default_policy: StepPolicy,
}

impl PolicyTable {
    /// Generation falls back to templates; every other delegated step halts
    pub fn from_settings(settings: &OrchestratorSettings) -> Self {
        let mut policies = HashMap::new();
        policies.insert(
            StepKind::Generate,
            StepPolicy::fallback(settings.codegen_timeout),
        );
        policies.insert(
            StepKind::PublishToCatalog,
            StepPolicy::halt(settings.catalog_timeout),
        );
        for kind in [StepKind::Commit, StepKind::OpenPr, StepKind::ConfigureDeploy] {
            policies.insert(kind, StepPolicy::halt(settings.external_timeout));
        }
        Self {
            policies,
            default_policy: StepPolicy::halt(settings.external_timeout),
        }
    }

    /// Replace the policy for one step and return self for chaining
    pub fn with_policy(mut self, kind: StepKind, policy: StepPolicy) -> Self {
        self.policies.insert(kind, policy);
        self
    }

    /// Override only the timeout of one step
    pub fn with_timeout(mut self, kind: StepKind, timeout: Duration) -> Self {
        let mut policy = self.get(kind);
        policy.timeout = timeout;
        self.policies.insert(kind, policy);
        self
    }

    pub fn get(&self, kind: StepKind) -> StepPolicy {
        self.policies
            .get(&kind)
            .copied()
            .unwrap_or(self.default_policy)
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::from_settings(&OrchestratorSettings::default())
    }
}
