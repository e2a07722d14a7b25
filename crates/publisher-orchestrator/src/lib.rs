//! # publisher-orchestrator
//!
//! Drives a design-to-pull-request publishing run: extracts design nodes,
//! generates code, publishes to a catalog, commits, opens a pull request and
//! configures a deploy. Network work is handed to a delegate over a
//! correlated request/response bridge; the run can be paused, resumed and
//! cancelled at step boundaries.

pub mod bridge;
pub mod codegen;
pub mod control;
pub mod error;
pub mod ledger;
pub mod observer;
pub mod operations;
pub mod orchestrator;
pub mod policy;
pub mod scene;
pub mod settings;

pub use bridge::{serve, BridgeChannel, BridgeEndpoint, BridgeResponder, Delegate};
pub use codegen::TemplateGenerator;
pub use control::{Checkpoint, PauseGate, RunHandle, WorkflowController};
pub use error::{OrchestratorError, Result};
pub use ledger::StepLedger;
pub use observer::{EventSink, ProgressTracker, RunState};
pub use orchestrator::{RunOutcome, WorkflowOrchestrator};
pub use policy::{FailureDecision, FailurePolicy, PolicyTable, RetryBackoff, StepPolicy};
pub use scene::{ExportFormat, InMemorySceneGraph, NodeInfo, SceneGraph, SceneSnapshot, SnapshotNode};
pub use settings::OrchestratorSettings;

/// Re-export common types for convenience
pub use publisher_types::{
    BridgeRequest, BridgeRequestKind, BridgeResponse, Step, StepKind, StepStatus, WorkflowConfig,
    WorkflowEvent,
};
