//! Design, Code and Publication Value Types
//!
//! These are the artifacts handed from one pipeline step to the next:
//! extracted design nodes, the normalized bundle, generated code, the file
//! tree, and the results reported back by external systems.

use serde::{Deserialize, Serialize};

/// Width and height of a design node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A design node extracted from the scene graph together with its exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub bounds: Bounds,
    /// Raster export at 2x scale; empty when the export failed
    #[serde(default)]
    pub image_data: Vec<u8>,
    /// Vector export; empty when the export failed
    #[serde(default)]
    pub svg_data: String,
    /// Deep link back to the node in the design tool
    pub source_url: String,
}

impl DesignNode {
    /// Deep link for a node inside a design file
    pub fn source_url_for(file_key: &str, node_id: &str) -> String {
        format!(
            "https://figma.com/file/{file_key}?node-id={}",
            node_id.replacen(':', "-", 1)
        )
    }

    /// Whether the raster export fell back to an empty placeholder
    pub fn has_image(&self) -> bool {
        !self.image_data.is_empty()
    }
}

/// Extracted nodes plus the file they came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignBundle {
    pub designs: Vec<DesignNode>,
    pub file_key: String,
    pub file_name: String,
}

/// Code produced for one design node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedComponent {
    pub name: String,
    pub html: String,
    pub react: String,
    pub tailwind: String,
    pub css: String,
}

/// Where a set of generated components came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeSource {
    /// Produced by the generation delegate
    Delegate,
    /// Produced locally from templates
    Template,
}

/// Generated code for every node in a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub components: Vec<GeneratedComponent>,
    pub source: CodeSource,
}

/// A single file to be committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
}

/// The materialized file tree for a run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileTree {
    pub files: Vec<FileEntry>,
}

impl FileTree {
    pub fn count(&self) -> usize {
        self.files.len()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }
}

/// Result of committing a file tree to a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub hash: String,
    pub branch: String,
    pub message: String,
    pub files: Vec<FileEntry>,
}

/// Version identifier and artifact locator returned by the hosting backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPublication {
    pub version_id: String,
    pub artifact_url: String,
}

/// Outcome of the catalog step; `Skipped` is a success variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CatalogOutcome {
    Published(CatalogPublication),
    Skipped,
}

impl CatalogOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, CatalogOutcome::Skipped)
    }
}
