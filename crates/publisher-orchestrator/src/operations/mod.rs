//! Pipeline Operations
//!
//! One module per step. Local operations compute their result in-process;
//! delegated operations go through the bridge under the step's policy.
//! Each operation reads what earlier steps left in `PipelineState` and
//! returns the ledger message for its success.

use crate::bridge::BridgeChannel;
use crate::codegen::TemplateGenerator;
use crate::error::{OrchestratorError, Result};
use crate::policy::{FailureDecision, PolicyTable};
use crate::scene::SceneGraph;
use crate::settings::OrchestratorSettings;
use publisher_types::{
    BridgeRequestKind, CatalogOutcome, CommitResult, DesignBundle, DesignNode, FileTree,
    GeneratedCode, StepKind, WorkflowConfig,
};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

pub mod catalog;
pub mod deploy;
pub mod extract;
pub mod files;
pub mod generate;
pub mod repository;

/// Everything a step operation may read
pub struct StepContext<'a> {
    pub config: &'a WorkflowConfig,
    pub bridge: &'a BridgeChannel,
    pub policies: &'a PolicyTable,
    pub settings: &'a OrchestratorSettings,
    pub scene: &'a dyn SceneGraph,
    pub generator: &'a TemplateGenerator,
}

/// Artifacts produced so far in a run
#[derive(Debug, Default)]
pub struct PipelineState {
    pub designs: Option<Vec<DesignNode>>,
    pub bundle: Option<DesignBundle>,
    pub code: Option<GeneratedCode>,
    pub catalog: Option<CatalogOutcome>,
    pub files: Option<FileTree>,
    pub commit: Option<CommitResult>,
    pub pr_url: Option<String>,
    pub deploy_url: Option<String>,
}

/// Artifact left by an earlier step, or a local error naming it
pub(crate) fn require<'s, T>(value: &'s Option<T>, what: &str) -> Result<&'s T> {
    value
        .as_ref()
        .ok_or_else(|| OrchestratorError::local(format!("Missing {what} from an earlier step")))
}

/// Run one delegated call under the step's failure policy
///
/// `Ok(Some(result))` on success, `Ok(None)` when the policy asks for the
/// fallback, `Err` when the step must halt.
pub(crate) async fn call_delegate(
    ctx: &StepContext<'_>,
    step: StepKind,
    kind: BridgeRequestKind,
    data: serde_json::Value,
) -> Result<Option<serde_json::Value>> {
    call_delegate_as(ctx, step, kind, data).await
}

/// Like `call_delegate`, decoding the result into `T`
///
/// A result that does not decode counts as a failed attempt, so it is
/// retried, substituted or halted on exactly like a transport failure.
pub(crate) async fn call_delegate_as<T: DeserializeOwned>(
    ctx: &StepContext<'_>,
    step: StepKind,
    kind: BridgeRequestKind,
    data: serde_json::Value,
) -> Result<Option<T>> {
    let policy = ctx.policies.get(step);
    let mut attempt = 1;

    loop {
        let error = match ctx.bridge.call(kind, data.clone(), policy.timeout).await {
            Ok(result) => match serde_json::from_value::<T>(result) {
                Ok(decoded) => return Ok(Some(decoded)),
                Err(e) => OrchestratorError::MalformedResponse {
                    kind,
                    detail: e.to_string(),
                },
            },
            Err(error) => error,
        };

        match policy.decide(attempt, &error) {
            FailureDecision::Retry(delay) => {
                warn!(
                    "[{}] Attempt {} failed ({}), retrying in {}ms",
                    step,
                    attempt,
                    error,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            FailureDecision::Fallback => {
                info!("[{}] Delegate unavailable ({}), using fallback", step, error);
                return Ok(None);
            }
            FailureDecision::Halt => return Err(error),
        }
    }
}

/// Millisecond timestamp used for branch names and version labels
pub(crate) fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
