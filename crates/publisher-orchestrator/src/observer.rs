//! Observer Plumbing
//!
//! `EventSink` is the producer side used by the orchestrator. `ProgressTracker`
//! is an observer-side view that follows the current run and ignores late
//! notifications from runs that were cancelled or replaced.

use publisher_types::{Step, WorkflowEvent};
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

/// Ordered, unbatched notification stream towards an observer
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<WorkflowEvent>>,
}

impl EventSink {
    /// Create a sink and the receiver an observer reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards everything (headless use)
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit one notification; a departed observer is not an error
    pub fn emit(&self, event: WorkflowEvent) {
        trace!("[EventSink] {}", event.event_type());
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                debug!("[EventSink] Observer gone, notification dropped");
            }
        }
    }
}

/// Observer-visible state of the tracked run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed {
        pr_url: String,
        deploy_url: String,
    },
    Failed {
        error: String,
    },
    Cancelled,
}

/// Observer-side progress view keyed by run identity
#[derive(Debug, Default)]
pub struct ProgressTracker {
    current_run: Option<Uuid>,
    steps: Vec<Step>,
    state: RunState,
    ignored: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a notification; returns `false` when it was ignored as stale
    pub fn apply(&mut self, event: &WorkflowEvent) -> bool {
        match event {
            WorkflowEvent::WorkflowStarted { run_id, steps } => {
                self.current_run = Some(*run_id);
                self.steps = steps.clone();
                self.state = RunState::Running;
                true
            }
            WorkflowEvent::WorkflowPaused { .. } => {
                if self.state == RunState::Running {
                    self.state = RunState::Paused;
                }
                true
            }
            WorkflowEvent::WorkflowResumed { .. } => {
                if self.state == RunState::Paused {
                    self.state = RunState::Running;
                }
                true
            }
            _ => {
                let Some(run_id) = event.run_id() else {
                    return true;
                };
                if !self.is_current(run_id) {
                    self.ignored += 1;
                    debug!(
                        "[ProgressTracker] Ignoring {} from stale run {}",
                        event.event_type(),
                        run_id
                    );
                    return false;
                }
                self.apply_current(event);
                true
            }
        }
    }

    fn apply_current(&mut self, event: &WorkflowEvent) {
        match event {
            WorkflowEvent::StepUpdated { step, .. } => {
                if let Some(existing) = self.steps.iter_mut().find(|s| s.id == step.id) {
                    *existing = step.clone();
                }
            }
            WorkflowEvent::WorkflowCancelled { .. } => {
                self.state = RunState::Cancelled;
                self.current_run = None;
            }
            WorkflowEvent::WorkflowCompleted {
                pr_url, deploy_url, ..
            } => {
                self.state = RunState::Completed {
                    pr_url: pr_url.clone(),
                    deploy_url: deploy_url.clone(),
                };
            }
            WorkflowEvent::WorkflowError { error, .. } => {
                self.state = RunState::Failed {
                    error: error.clone(),
                };
            }
            _ => {}
        }
    }

    fn is_current(&self, run_id: Uuid) -> bool {
        self.current_run == Some(run_id)
    }

    pub fn current_run(&self) -> Option<Uuid> {
        self.current_run
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Number of notifications dropped as stale
    pub fn ignored_count(&self) -> usize {
        self.ignored
    }
}
