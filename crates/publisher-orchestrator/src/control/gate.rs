//! Pause Gate
//!
//! Process-wide open/closed flag consulted at every step checkpoint. A closed
//! gate suspends the pipeline on a watch channel until it reopens or the run
//! is cancelled; nothing polls.

use super::RunHandle;
use tokio::sync::watch;
use tracing::debug;

/// Result of consulting the gate at a step boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// The gate was open (or reopened); run the step
    Proceed,
    /// The run was cancelled while at or before the checkpoint
    Cancelled,
}

#[derive(Debug)]
pub struct PauseGate {
    paused: watch::Sender<bool>,
}

impl PauseGate {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self { paused }
    }

    /// Close the gate; returns `false` if it was already closed
    pub fn close(&self) -> bool {
        !self.paused.send_replace(true)
    }

    /// Open the gate; returns `false` if it was already open
    pub fn open(&self) -> bool {
        self.paused.send_replace(false)
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Wait at a step boundary until the gate is open or `run` is cancelled
    pub async fn checkpoint(&self, run: &RunHandle) -> Checkpoint {
        let mut paused = self.paused.subscribe();
        let mut cancelled = run.subscribe();
        let mut suspended = false;

        loop {
            if *cancelled.borrow_and_update() {
                return Checkpoint::Cancelled;
            }
            if !*paused.borrow_and_update() {
                if suspended {
                    debug!("[PauseGate] Run {} resumed at checkpoint", run.id());
                }
                return Checkpoint::Proceed;
            }
            if !suspended {
                debug!("[PauseGate] Run {} suspended at checkpoint", run.id());
                suspended = true;
            }

            tokio::select! {
                changed = paused.changed() => {
                    if changed.is_err() {
                        return Checkpoint::Cancelled;
                    }
                }
                changed = cancelled.changed() => {
                    if changed.is_err() {
                        return Checkpoint::Cancelled;
                    }
                }
            }
        }
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}
