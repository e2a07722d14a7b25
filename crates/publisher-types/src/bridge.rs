//! Bridge Wire Types
//!
//! Messages exchanged with the delegate across the process boundary.
//! Requests carry a generated correlation id; the matching response must
//! echo that id and carry the paired response type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Kinds of delegated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BridgeRequestKind {
    /// Code generation through an external assistant
    Codegen,
    /// Commit a file tree to a new branch
    Commit,
    /// Open a pull request
    PullRequest,
    /// Configure the hosting deploy
    Deploy,
    /// Publish components to the hosted catalog
    CatalogPublish,
}

impl BridgeRequestKind {
    pub const ALL: [BridgeRequestKind; 5] = [
        BridgeRequestKind::Codegen,
        BridgeRequestKind::Commit,
        BridgeRequestKind::PullRequest,
        BridgeRequestKind::Deploy,
        BridgeRequestKind::CatalogPublish,
    ];

    /// Outbound message type
    pub fn request_type(&self) -> &'static str {
        match self {
            BridgeRequestKind::Codegen => "codegen-request",
            BridgeRequestKind::Commit => "commit-request",
            BridgeRequestKind::PullRequest => "pr-request",
            BridgeRequestKind::Deploy => "deploy-request",
            BridgeRequestKind::CatalogPublish => "catalog-publish-request",
        }
    }

    /// Inbound message type that answers this request
    pub fn response_type(&self) -> &'static str {
        match self {
            BridgeRequestKind::Codegen => "codegen-response",
            BridgeRequestKind::Commit => "commit-response",
            BridgeRequestKind::PullRequest => "pr-response",
            BridgeRequestKind::Deploy => "deploy-response",
            BridgeRequestKind::CatalogPublish => "catalog-publish-response",
        }
    }

    /// Operation label used in error messages
    pub fn operation(&self) -> &'static str {
        match self {
            BridgeRequestKind::Codegen => "Code generation",
            BridgeRequestKind::Commit => "Git commit",
            BridgeRequestKind::PullRequest => "PR creation",
            BridgeRequestKind::Deploy => "Deploy configuration",
            BridgeRequestKind::CatalogPublish => "Catalog publish",
        }
    }

    /// Default bounded wait for a response
    pub fn default_timeout(&self) -> Duration {
        match self {
            BridgeRequestKind::Codegen => Duration::from_secs(120),
            BridgeRequestKind::Commit
            | BridgeRequestKind::PullRequest
            | BridgeRequestKind::Deploy => Duration::from_secs(60),
            BridgeRequestKind::CatalogPublish => Duration::from_secs(30),
        }
    }

    pub fn from_request_type(message_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.request_type() == message_type)
    }
}

impl fmt::Display for BridgeRequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.request_type())
    }
}

/// Outbound request to the delegate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    /// Correlation id the response must echo
    pub correlation_id: Uuid,
    /// Request message type
    #[serde(rename = "type")]
    pub message_type: String,
    /// JSON payload
    pub data: serde_json::Value,
}

impl BridgeRequest {
    /// Create a request with a freshly generated correlation id
    pub fn new(kind: BridgeRequestKind, data: serde_json::Value) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            message_type: kind.request_type().to_string(),
            data,
        }
    }

    pub fn kind(&self) -> Option<BridgeRequestKind> {
        BridgeRequestKind::from_request_type(&self.message_type)
    }

    /// Build a successful response for this request
    pub fn reply_ok(&self, result: serde_json::Value) -> BridgeResponse {
        BridgeResponse {
            correlation_id: self.correlation_id,
            message_type: self.response_type(),
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Build a failed response for this request
    pub fn reply_err(&self, error: impl Into<String>) -> BridgeResponse {
        BridgeResponse {
            correlation_id: self.correlation_id,
            message_type: self.response_type(),
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    fn response_type(&self) -> String {
        self.kind()
            .map(|k| k.response_type().to_string())
            .unwrap_or_else(|| self.message_type.replace("-request", "-response"))
    }
}

/// Inbound response from the delegate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    /// Correlation id of the request being answered
    pub correlation_id: Uuid,
    /// Response message type
    #[serde(rename = "type")]
    pub message_type: String,
    /// Whether the delegate completed the operation
    pub success: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}
