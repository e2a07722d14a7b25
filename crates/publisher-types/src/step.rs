//! Pipeline Step Types
//!
//! A run is a fixed, ordered list of steps. Each step carries a stable id,
//! a display label, and a status that only ever moves forward.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single step within a run
///
/// Valid transitions:
/// - `Pending` -> `Running`
/// - `Running` -> `Success`
/// - `Running` -> `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step has not started yet
    #[default]
    Pending,
    /// Step is currently executing
    Running,
    /// Step finished successfully
    Success,
    /// Step finished with an error
    Error,
}

impl StepStatus {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Error => "error",
        }
    }

    /// Whether the status is terminal for a step
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Error)
    }

    /// Check whether moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: StepStatus) -> bool {
        matches!(
            (self, next),
            (StepStatus::Pending, StepStatus::Running)
                | (StepStatus::Running, StepStatus::Success)
                | (StepStatus::Running, StepStatus::Error)
        )
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stages of the publishing pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// Read design nodes and their exports from the scene graph
    Extract,
    /// Normalize extracted nodes into a design bundle
    Transform,
    /// Produce component code (delegate or template fallback)
    Generate,
    /// Publish generated components to the hosted catalog
    PublishToCatalog,
    /// Lay out the generated code as a file tree
    WriteFiles,
    /// Commit the file tree to a fresh branch
    Commit,
    /// Open a pull request for the branch
    OpenPr,
    /// Configure the hosting deploy
    ConfigureDeploy,
}

impl StepKind {
    /// Every step, in pipeline order
    pub const PIPELINE: [StepKind; 8] = [
        StepKind::Extract,
        StepKind::Transform,
        StepKind::Generate,
        StepKind::PublishToCatalog,
        StepKind::WriteFiles,
        StepKind::Commit,
        StepKind::OpenPr,
        StepKind::ConfigureDeploy,
    ];

    /// Stable step identifier used in the ledger and in notifications
    pub fn id(&self) -> &'static str {
        match self {
            StepKind::Extract => "extract",
            StepKind::Transform => "transform",
            StepKind::Generate => "generate-code",
            StepKind::PublishToCatalog => "catalog-publish",
            StepKind::WriteFiles => "create-files",
            StepKind::Commit => "git-commit",
            StepKind::OpenPr => "open-pr",
            StepKind::ConfigureDeploy => "configure-deploy",
        }
    }

    /// Human readable label shown by observers
    pub fn display_name(&self) -> &'static str {
        match self {
            StepKind::Extract => "Extraindo designs do Figma",
            StepKind::Transform => "Processando dados de design",
            StepKind::Generate => "Gerando código (HTML, React, Tailwind)",
            StepKind::PublishToCatalog => "Publicando no catálogo",
            StepKind::WriteFiles => "Criando estrutura de arquivos",
            StepKind::Commit => "Fazendo commit no Git",
            StepKind::OpenPr => "Criando Pull Request",
            StepKind::ConfigureDeploy => "Configurando deploy",
        }
    }

    /// Look up a step kind by its stable identifier
    pub fn from_id(id: &str) -> Option<StepKind> {
        StepKind::PIPELINE.into_iter().find(|kind| kind.id() == id)
    }

    /// Whether the step talks to the delegate through the bridge
    pub fn is_delegated(&self) -> bool {
        matches!(
            self,
            StepKind::Generate
                | StepKind::PublishToCatalog
                | StepKind::Commit
                | StepKind::OpenPr
                | StepKind::ConfigureDeploy
        )
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One named stage of a run with its observable status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier, unique within a run
    pub id: String,
    /// Display label
    pub name: String,
    /// Current status
    pub status: StepStatus,
    /// Optional human readable message attached by the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Step {
    /// Create a pending step for the given pipeline stage
    pub fn pending(kind: StepKind) -> Self {
        Self {
            id: kind.id().to_string(),
            name: kind.display_name().to_string(),
            status: StepStatus::Pending,
            message: None,
        }
    }

    /// The full pipeline as pending steps
    pub fn pipeline() -> Vec<Step> {
        StepKind::PIPELINE.into_iter().map(Step::pending).collect()
    }
}
