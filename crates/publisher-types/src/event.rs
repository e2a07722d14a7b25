//! Observer Notifications
//!
//! Every notification carries the id of the run that produced it so an
//! observer can tell a stale run's late writes apart from the current run.

use crate::step::Step;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification emitted to observers, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum WorkflowEvent {
    /// A run started; carries the full pending step list
    WorkflowStarted { run_id: Uuid, steps: Vec<Step> },
    /// One step changed status
    StepUpdated { run_id: Uuid, step: Step },
    /// The pause gate closed
    WorkflowPaused { run_id: Option<Uuid> },
    /// The pause gate reopened
    WorkflowResumed { run_id: Option<Uuid> },
    /// The current run was cancelled
    WorkflowCancelled { run_id: Uuid },
    /// Every step succeeded
    WorkflowCompleted {
        run_id: Uuid,
        pr_url: String,
        deploy_url: String,
    },
    /// The run halted on an unrecovered error
    WorkflowError { run_id: Uuid, error: String },
}

impl WorkflowEvent {
    /// Run the notification belongs to, if it is run-scoped
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            WorkflowEvent::WorkflowStarted { run_id, .. }
            | WorkflowEvent::StepUpdated { run_id, .. }
            | WorkflowEvent::WorkflowCancelled { run_id }
            | WorkflowEvent::WorkflowCompleted { run_id, .. }
            | WorkflowEvent::WorkflowError { run_id, .. } => Some(*run_id),
            WorkflowEvent::WorkflowPaused { run_id } | WorkflowEvent::WorkflowResumed { run_id } => {
                *run_id
            }
        }
    }

    /// Wire name of the notification
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::WorkflowStarted { .. } => "workflow-started",
            WorkflowEvent::StepUpdated { .. } => "step-updated",
            WorkflowEvent::WorkflowPaused { .. } => "workflow-paused",
            WorkflowEvent::WorkflowResumed { .. } => "workflow-resumed",
            WorkflowEvent::WorkflowCancelled { .. } => "workflow-cancelled",
            WorkflowEvent::WorkflowCompleted { .. } => "workflow-completed",
            WorkflowEvent::WorkflowError { .. } => "workflow-error",
        }
    }

    /// Whether the notification ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowEvent::WorkflowCancelled { .. }
                | WorkflowEvent::WorkflowCompleted { .. }
                | WorkflowEvent::WorkflowError { .. }
        )
    }
}
