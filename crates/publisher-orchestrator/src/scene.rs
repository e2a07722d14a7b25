//! Scene-Graph Collaborator
//!
//! The design tool's node tree is consumed through `SceneGraph`. The
//! in-memory implementation serves a JSON snapshot and is what the runner
//! and tests use.

use crate::error::{OrchestratorError, Result};
use async_trait::async_trait;
use publisher_types::Bounds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata of a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub bounds: Bounds,
}

/// Export formats requested during extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Png { scale: f64 },
    Svg,
}

#[async_trait]
pub trait SceneGraph: Send + Sync {
    /// Key of the design file the nodes belong to
    fn file_key(&self) -> &str;

    /// Display name of the design file
    fn file_name(&self) -> &str;

    /// Node metadata, or `None` when the id is unknown
    async fn node(&self, node_id: &str) -> Option<NodeInfo>;

    /// Render an export of a node
    async fn export(&self, node_id: &str, format: ExportFormat) -> Result<Vec<u8>>;
}

/// A node inside a snapshot, with pre-rendered exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    #[serde(flatten)]
    pub info: NodeInfo,
    /// PNG bytes; absent means the raster export fails
    #[serde(default)]
    pub png: Option<Vec<u8>>,
    /// SVG markup; absent means the vector export fails
    #[serde(default)]
    pub svg: Option<String>,
}

/// Serializable scene used by the in-memory scene graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub file_key: String,
    pub file_name: String,
    pub nodes: Vec<SnapshotNode>,
}

#[derive(Debug, Clone)]
pub struct InMemorySceneGraph {
    file_key: String,
    file_name: String,
    nodes: HashMap<String, SnapshotNode>,
}

impl InMemorySceneGraph {
    pub fn new(file_key: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            file_key: file_key.into(),
            file_name: file_name.into(),
            nodes: HashMap::new(),
        }
    }

    pub fn from_snapshot(snapshot: SceneSnapshot) -> Self {
        let mut scene = Self::new(snapshot.file_key, snapshot.file_name);
        for node in snapshot.nodes {
            scene.insert(node);
        }
        scene
    }

    pub fn insert(&mut self, node: SnapshotNode) {
        self.nodes.insert(node.info.id.clone(), node);
    }

    /// Add a node with both exports available and return self for chaining
    pub fn with_node(mut self, id: &str, name: &str, width: f64, height: f64) -> Self {
        self.insert(SnapshotNode {
            info: NodeInfo {
                id: id.to_string(),
                name: name.to_string(),
                node_type: "COMPONENT".to_string(),
                bounds: Bounds::new(width, height),
            },
            png: Some(vec![0x89, b'P', b'N', b'G']),
            svg: Some(format!("<svg width=\"{width}\" height=\"{height}\"></svg>")),
        });
        self
    }

    /// Add a node whose exports both fail and return self for chaining
    pub fn with_unexportable_node(mut self, id: &str, name: &str, width: f64, height: f64) -> Self {
        self.insert(SnapshotNode {
            info: NodeInfo {
                id: id.to_string(),
                name: name.to_string(),
                node_type: "COMPONENT".to_string(),
                bounds: Bounds::new(width, height),
            },
            png: None,
            svg: None,
        });
        self
    }
}

#[async_trait]
impl SceneGraph for InMemorySceneGraph {
    fn file_key(&self) -> &str {
        &self.file_key
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }

    async fn node(&self, node_id: &str) -> Option<NodeInfo> {
        self.nodes.get(node_id).map(|n| n.info.clone())
    }

    async fn export(&self, node_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        let node = self
            .nodes
            .get(node_id)
            .ok_or_else(|| OrchestratorError::local(format!("Unknown node {node_id}")))?;
        let exported = match format {
            ExportFormat::Png { .. } => node.png.clone(),
            ExportFormat::Svg => node.svg.clone().map(String::into_bytes),
        };
        exported.ok_or_else(|| {
            OrchestratorError::local(format!("Export {format:?} failed for {}", node.info.name))
        })
    }
}
