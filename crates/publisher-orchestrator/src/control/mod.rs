//! Run Control
//!
//! `WorkflowController` owns the two pieces of state shared across suspension
//! points: the pause gate and the reference to the current run. External
//! commands (pause, resume, cancel) arrive here; the orchestrator consults it
//! at checkpoints and before every ledger mutation.

use crate::observer::EventSink;
use chrono::{DateTime, Utc};
use publisher_types::WorkflowEvent;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

pub mod gate;

pub use gate::{Checkpoint, PauseGate};

/// Identity and cancellation flag of one run
#[derive(Debug, Clone)]
pub struct RunHandle {
    id: Uuid,
    started_at: DateTime<Utc>,
    cancelled: Arc<watch::Sender<bool>>,
}

impl RunHandle {
    fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            cancelled: Arc::new(cancelled),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.cancelled.subscribe()
    }
}

/// Pause/resume/cancel control and current-run registry
#[derive(Debug)]
pub struct WorkflowController {
    gate: PauseGate,
    current: Mutex<Option<RunHandle>>,
    events: EventSink,
}

impl WorkflowController {
    pub fn new(events: EventSink) -> Arc<Self> {
        Arc::new(Self {
            gate: PauseGate::new(),
            current: Mutex::new(None),
            events,
        })
    }

    pub fn gate(&self) -> &PauseGate {
        &self.gate
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Register a new current run, superseding any run still in flight
    ///
    /// The superseded run is cancelled cooperatively: it stops at its next
    /// checkpoint and every later ledger write it attempts is refused.
    pub async fn begin_run(&self) -> RunHandle {
        let run = RunHandle::new();
        let previous = self.current.lock().await.replace(run.clone());
        if let Some(previous) = previous {
            warn!(
                "[WorkflowController] Run {} superseded by {}",
                previous.id(),
                run.id()
            );
            previous.cancel();
        }
        info!("[WorkflowController] Run {} is now current", run.id());
        run
    }

    /// Clear the current run if it is still `run`
    pub async fn finish_run(&self, run: &RunHandle) {
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|c| c.id() == run.id()) {
            *current = None;
        }
    }

    /// Identity check applied before any ledger mutation
    pub async fn is_current(&self, run: &RunHandle) -> bool {
        !run.is_cancelled()
            && self
                .current
                .lock()
                .await
                .as_ref()
                .is_some_and(|c| c.id() == run.id())
    }

    pub async fn current_run_id(&self) -> Option<Uuid> {
        self.current.lock().await.as_ref().map(RunHandle::id)
    }

    /// Close the gate; the pipeline stops at its next checkpoint
    pub async fn pause(&self) -> bool {
        if !self.gate.close() {
            return false;
        }
        let run_id = self.current_run_id().await;
        info!("[WorkflowController] Paused (run: {:?})", run_id);
        self.events.emit(WorkflowEvent::WorkflowPaused { run_id });
        true
    }

    /// Reopen the gate, waking a suspended run; no-op when not paused
    pub async fn resume(&self) -> bool {
        if !self.gate.open() {
            return false;
        }
        let run_id = self.current_run_id().await;
        info!("[WorkflowController] Resumed (run: {:?})", run_id);
        self.events.emit(WorkflowEvent::WorkflowResumed { run_id });
        true
    }

    /// Cancel the current run; no-op when no run is active
    ///
    /// Opens the gate so a suspended run wakes up and observes the
    /// cancellation. Calls already waiting on the bridge are not aborted.
    pub async fn cancel(&self) -> Option<Uuid> {
        let run = self.current.lock().await.take()?;
        run.cancel();
        self.gate.open();
        info!("[WorkflowController] Run {} cancelled", run.id());
        self.events
            .emit(WorkflowEvent::WorkflowCancelled { run_id: run.id() });
        Some(run.id())
    }
}
