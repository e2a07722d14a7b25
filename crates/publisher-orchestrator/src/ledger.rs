//! Step Ledger
//!
//! Ordered steps of one run. Only the orchestrator mutates it, one
//! transition at a time, and every transition emits exactly one
//! `step-updated` notification followed by a settling delay so an observer
//! can render it before the next step begins.

use crate::control::{RunHandle, WorkflowController};
use crate::error::{OrchestratorError, Result};
use crate::observer::EventSink;
use publisher_types::{Step, StepStatus, WorkflowEvent};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct StepLedger {
    run: RunHandle,
    controller: Arc<WorkflowController>,
    steps: Vec<Step>,
    events: EventSink,
    settle_delay: Duration,
}

impl StepLedger {
    /// Create the ledger for `run` with every pipeline step pending
    pub fn new(
        run: RunHandle,
        controller: Arc<WorkflowController>,
        events: EventSink,
        settle_delay: Duration,
    ) -> Self {
        Self {
            run,
            controller,
            steps: Step::pipeline(),
            events,
            settle_delay,
        }
    }

    pub fn run(&self) -> &RunHandle {
        &self.run
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Transition `step_id` to `status`, attach `message`, notify, then settle
    ///
    /// Refused with `StaleRun` once the run is no longer current; the ledger
    /// is left untouched and nothing is emitted in that case.
    pub async fn advance(
        &mut self,
        step_id: &str,
        status: StepStatus,
        message: Option<String>,
    ) -> Result<()> {
        if !self.controller.is_current(&self.run).await {
            warn!(
                "[StepLedger] Discarding {} -> {} for stale run {}",
                step_id,
                status,
                self.run.id()
            );
            return Err(OrchestratorError::StaleRun(self.run.id()));
        }

        let step = self
            .steps
            .iter_mut()
            .find(|s| s.id == step_id)
            .ok_or_else(|| OrchestratorError::UnknownStep(step_id.to_string()))?;

        if !step.status.can_transition_to(status) {
            return Err(OrchestratorError::InvalidTransition {
                step_id: step_id.to_string(),
                from: step.status,
                to: status,
            });
        }

        step.status = status;
        step.message = message;
        debug!(
            "[StepLedger] {} -> {}{}",
            step.id,
            status,
            step.message
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default()
        );
        self.events.emit(WorkflowEvent::StepUpdated {
            run_id: self.run.id(),
            step: step.clone(),
        });

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        Ok(())
    }
}
