use publisher_types::BridgeRequestKind;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while driving a workflow run
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Required credentials are absent; raised before any message is sent
    #[error("{0}")]
    MissingCredentials(String),

    /// The delegate answered with `success: false`
    #[error("{message}")]
    DelegateFailure {
        kind: BridgeRequestKind,
        message: String,
    },

    /// No response arrived within the bounded wait
    #[error("{} timeout", kind.operation())]
    Timeout {
        kind: BridgeRequestKind,
        timeout_ms: u64,
    },

    /// The delegate side of the bridge has gone away
    #[error("Bridge channel closed while sending {0}")]
    ChannelClosed(BridgeRequestKind),

    /// The delegate reported success but the result is unusable
    #[error("Malformed {kind} response: {detail}")]
    MalformedResponse {
        kind: BridgeRequestKind,
        detail: String,
    },

    /// A local step operation failed
    #[error("{0}")]
    Local(String),

    /// The run was cancelled or replaced and may no longer mutate its ledger
    #[error("Run {0} is no longer current")]
    StaleRun(Uuid),

    #[error("Unknown step '{0}'")]
    UnknownStep(String),

    #[error("Invalid transition for step '{step_id}': {from} -> {to}")]
    InvalidTransition {
        step_id: String,
        from: publisher_types::StepStatus,
        to: publisher_types::StepStatus,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn missing_credentials(msg: impl Into<String>) -> Self {
        Self::MissingCredentials(msg.into())
    }

    pub fn local(msg: impl Into<String>) -> Self {
        Self::Local(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Failures a per-step policy may absorb (retry or fallback)
    pub fn is_delegate_outcome(&self) -> bool {
        matches!(
            self,
            Self::DelegateFailure { .. }
                | Self::Timeout { .. }
                | Self::ChannelClosed(_)
                | Self::MalformedResponse { .. }
        )
    }
}

impl From<handlebars::TemplateError> for OrchestratorError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template(err.to_string())
    }
}

impl From<handlebars::RenderError> for OrchestratorError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template(err.to_string())
    }
}

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;
