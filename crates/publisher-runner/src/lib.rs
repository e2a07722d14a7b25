//! Local runner for design publishing workflows
//!
//! Loads a scene snapshot and a workflow configuration from disk, drives the
//! orchestrator against a dry-run delegate, and streams notifications as
//! JSON lines.

use anyhow::{Context, Result};
use publisher_orchestrator::{SceneSnapshot, WorkflowController};
use publisher_types::WorkflowConfig;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub mod delegate;
pub mod renderer;

pub use delegate::DryRunDelegate;

/// Load a scene snapshot from a JSON file
pub fn load_scene(path: &Path) -> Result<SceneSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene snapshot {}", path.display()))?;
    let snapshot: SceneSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid scene snapshot {}", path.display()))?;
    debug!(
        "[publisher-runner] Loaded {} nodes from {}",
        snapshot.nodes.len(),
        path.display()
    );
    Ok(snapshot)
}

/// Load a workflow configuration from a JSON file
pub fn load_config(path: &Path) -> Result<WorkflowConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow config {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid workflow config {}", path.display()))
}

/// Operator command read from stdin while a run is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Cancel,
}

impl FromStr for ControlCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(ControlCommand::Pause),
            "resume" => Ok(ControlCommand::Resume),
            "cancel" => Ok(ControlCommand::Cancel),
            other => anyhow::bail!("Unknown command '{other}' (expected pause, resume or cancel)"),
        }
    }
}

impl ControlCommand {
    /// Forward the command to the controller
    pub async fn apply(self, controller: &WorkflowController) {
        let applied = match self {
            ControlCommand::Pause => controller.pause().await,
            ControlCommand::Resume => controller.resume().await,
            ControlCommand::Cancel => controller.cancel().await.is_some(),
        };
        if !applied {
            info!("[publisher-runner] {:?} had no effect", self);
        }
    }
}
