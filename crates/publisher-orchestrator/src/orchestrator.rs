//! Workflow Orchestrator
//!
//! Drives one run through the fixed pipeline. Before each step the run stops
//! at the pause gate; the step is then marked running, executed, and marked
//! success or error. The first unrecovered error halts the run. Every ledger
//! write goes through the run's identity check, so a run that was cancelled
//! or superseded stops touching shared state as soon as it wakes up.

use crate::bridge::BridgeChannel;
use crate::codegen::TemplateGenerator;
use crate::control::{Checkpoint, WorkflowController};
use crate::error::{OrchestratorError, Result};
use crate::ledger::StepLedger;
use crate::observer::EventSink;
use crate::operations::{self, PipelineState, StepContext};
use crate::policy::PolicyTable;
use crate::scene::SceneGraph;
use crate::settings::OrchestratorSettings;
use publisher_types::{StepKind, StepStatus, WorkflowConfig, WorkflowEvent};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step succeeded
    Completed {
        run_id: Uuid,
        pr_url: String,
        deploy_url: String,
    },
    /// `step` failed and the run halted there
    Failed {
        run_id: Uuid,
        step: StepKind,
        error: String,
    },
    /// The run was cancelled or superseded; `at_step` is where it noticed
    Cancelled { run_id: Uuid, at_step: StepKind },
}

impl RunOutcome {
    pub fn run_id(&self) -> Uuid {
        match self {
            RunOutcome::Completed { run_id, .. }
            | RunOutcome::Failed { run_id, .. }
            | RunOutcome::Cancelled { run_id, .. } => *run_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

pub struct WorkflowOrchestrator {
    bridge: BridgeChannel,
    scene: Arc<dyn SceneGraph>,
    policies: PolicyTable,
    settings: OrchestratorSettings,
    generator: TemplateGenerator,
    controller: Arc<WorkflowController>,
}

impl WorkflowOrchestrator {
    /// Create an orchestrator with the default policy table for `settings`
    pub fn new(
        bridge: BridgeChannel,
        scene: Arc<dyn SceneGraph>,
        settings: OrchestratorSettings,
        events: EventSink,
    ) -> Result<Self> {
        Ok(Self {
            bridge,
            scene,
            policies: PolicyTable::from_settings(&settings),
            settings,
            generator: TemplateGenerator::new()?,
            controller: WorkflowController::new(events),
        })
    }

    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    /// Handle for pause, resume and cancel commands
    pub fn controller(&self) -> Arc<WorkflowController> {
        self.controller.clone()
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run the whole pipeline for `config`
    ///
    /// Starting a run supersedes any run still in flight. Exactly one of
    /// `workflow-completed` or `workflow-error` is emitted for a run that is
    /// still current when it ends; a cancelled run emits neither.
    #[instrument(skip(self, config), fields(components = config.components.len()))]
    pub async fn run(&self, config: WorkflowConfig) -> RunOutcome {
        let started = Instant::now();
        let run = self.controller.begin_run().await;
        let run_id = run.id();
        let events = self.controller.events().clone();
        let mut ledger = StepLedger::new(
            run.clone(),
            self.controller.clone(),
            events.clone(),
            self.settings.settle_delay,
        );

        info!(
            "[WorkflowOrchestrator] Starting run {} for {} components",
            run_id,
            config.components.len()
        );
        events.emit(WorkflowEvent::WorkflowStarted {
            run_id,
            steps: ledger.steps().to_vec(),
        });
        if self.controller.gate().is_paused() {
            info!(
                "[WorkflowOrchestrator] Run {} starts with the gate closed",
                run_id
            );
            events.emit(WorkflowEvent::WorkflowPaused {
                run_id: Some(run_id),
            });
        }

        let ctx = StepContext {
            config: &config,
            bridge: &self.bridge,
            policies: &self.policies,
            settings: &self.settings,
            scene: self.scene.as_ref(),
            generator: &self.generator,
        };
        let mut state = PipelineState::default();
        let outcome = self.drive(&ctx, &mut ledger, &mut state).await;

        if self.controller.is_current(&run).await {
            match &outcome {
                RunOutcome::Completed {
                    pr_url, deploy_url, ..
                } => {
                    info!(
                        "[WorkflowOrchestrator] Run {} completed in {}ms",
                        run_id,
                        started.elapsed().as_millis()
                    );
                    events.emit(WorkflowEvent::WorkflowCompleted {
                        run_id,
                        pr_url: pr_url.clone(),
                        deploy_url: deploy_url.clone(),
                    });
                }
                RunOutcome::Failed { step, error, .. } => {
                    error!(
                        "[WorkflowOrchestrator] Run {} halted at {}: {}",
                        run_id, step, error
                    );
                    events.emit(WorkflowEvent::WorkflowError {
                        run_id,
                        error: error.clone(),
                    });
                }
                RunOutcome::Cancelled { .. } => {}
            }
        } else {
            info!(
                "[WorkflowOrchestrator] Run {} ended after it stopped being current",
                run_id
            );
        }

        self.controller.finish_run(&run).await;
        outcome
    }

    async fn drive(
        &self,
        ctx: &StepContext<'_>,
        ledger: &mut StepLedger,
        state: &mut PipelineState,
    ) -> RunOutcome {
        let run_id = ledger.run().id();

        for kind in StepKind::PIPELINE {
            if self.controller.gate().checkpoint(ledger.run()).await == Checkpoint::Cancelled {
                info!(
                    "[WorkflowOrchestrator] Run {} cancelled before {}",
                    run_id, kind
                );
                return RunOutcome::Cancelled {
                    run_id,
                    at_step: kind,
                };
            }

            if let Err(e) = ledger.advance(kind.id(), StepStatus::Running, None).await {
                return bookkeeping_outcome(run_id, kind, e);
            }

            match execute_step(kind, ctx, state).await {
                Ok(message) => {
                    if let Err(e) = ledger
                        .advance(kind.id(), StepStatus::Success, Some(message))
                        .await
                    {
                        return bookkeeping_outcome(run_id, kind, e);
                    }
                }
                Err(step_error) => {
                    let error = step_error.to_string();
                    warn!("[WorkflowOrchestrator] Step {} failed: {}", kind, error);
                    if let Err(e) = ledger
                        .advance(kind.id(), StepStatus::Error, Some(error.clone()))
                        .await
                    {
                        return bookkeeping_outcome(run_id, kind, e);
                    }
                    return RunOutcome::Failed {
                        run_id,
                        step: kind,
                        error,
                    };
                }
            }
        }

        RunOutcome::Completed {
            run_id,
            pr_url: state.pr_url.take().unwrap_or_default(),
            deploy_url: state.deploy_url.take().unwrap_or_default(),
        }
    }
}

async fn execute_step(
    kind: StepKind,
    ctx: &StepContext<'_>,
    state: &mut PipelineState,
) -> Result<String> {
    match kind {
        StepKind::Extract => operations::extract::extract(ctx, state).await,
        StepKind::Transform => operations::extract::transform(ctx, state).await,
        StepKind::Generate => operations::generate::generate(ctx, state).await,
        StepKind::PublishToCatalog => operations::catalog::publish(ctx, state).await,
        StepKind::WriteFiles => operations::files::write_files(ctx, state).await,
        StepKind::Commit => operations::repository::commit(ctx, state).await,
        StepKind::OpenPr => operations::repository::open_pull_request(ctx, state).await,
        StepKind::ConfigureDeploy => operations::deploy::configure(ctx, state).await,
    }
}

/// Outcome for a refused ledger write
fn bookkeeping_outcome(run_id: Uuid, kind: StepKind, error: OrchestratorError) -> RunOutcome {
    match error {
        OrchestratorError::StaleRun(_) => RunOutcome::Cancelled {
            run_id,
            at_step: kind,
        },
        other => RunOutcome::Failed {
            run_id,
            step: kind,
            error: other.to_string(),
        },
    }
}
