//! Dry-run delegate
//!
//! Answers bridge requests without touching the network. Commits and catalog
//! publications are written under an output directory so a run can be
//! inspected afterwards; pull request and deploy URLs are synthesized.

use anyhow::{Context, Result};
use async_trait::async_trait;
use publisher_orchestrator::Delegate;
use publisher_types::{BridgeRequest, BridgeRequestKind, BridgeResponse, FileEntry};
use serde_json::{json, Value};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

pub const REPOSITORY_DIR: &str = "repository";
pub const CATALOG_DIR: &str = "catalog";

#[derive(Debug, Clone)]
pub struct DryRunDelegate {
    output_dir: PathBuf,
}

impl DryRunDelegate {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn dispatch(&self, kind: BridgeRequestKind, data: &Value) -> Result<Value> {
        match kind {
            BridgeRequestKind::Codegen => {
                anyhow::bail!("Code generation is not available in dry-run mode")
            }
            BridgeRequestKind::Commit => self.commit(data),
            BridgeRequestKind::PullRequest => self.pull_request(data),
            BridgeRequestKind::Deploy => Ok(deploy(data)),
            BridgeRequestKind::CatalogPublish => self.catalog_publish(data),
        }
    }

    fn commit(&self, data: &Value) -> Result<Value> {
        let branch = str_field(data, "branchName")?;
        let files: Vec<FileEntry> = serde_json::from_value(data["files"].clone())
            .context("Commit request carries no file list")?;

        let root = self.output_dir.join(REPOSITORY_DIR).join(safe_relative(branch)?);
        for file in &files {
            let relative = safe_relative(&file.path)?;
            let target = root.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&target, &file.content)
                .with_context(|| format!("Failed to write {}", target.display()))?;
        }

        let sha = Uuid::new_v4().simple().to_string();
        info!(
            "[DryRunDelegate] Wrote {} files for {} to {}",
            files.len(),
            branch,
            root.display()
        );
        Ok(json!({ "sha": &sha[..12], "branch": branch }))
    }

    fn pull_request(&self, data: &Value) -> Result<Value> {
        let owner = str_field(data, "repoOwner")?;
        let name = str_field(data, "repoName")?;
        let head = str_field(data, "head")?;
        let body = data["body"].as_str().unwrap_or_default();

        let path = self
            .output_dir
            .join(REPOSITORY_DIR)
            .join(safe_relative(head)?)
            .join("PULL_REQUEST.md");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(json!({ "html_url": format!("https://github.com/{owner}/{name}/pull/dry-run") }))
    }

    fn catalog_publish(&self, data: &Value) -> Result<Value> {
        let project_id = str_field(data, "projectId")?;
        let version = str_field(data, "version")?;
        let relative = safe_relative(&format!("{project_id}/{version}.json"))?;

        let path = self.output_dir.join(CATALOG_DIR).join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_vec_pretty(&data["payload"])?)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(json!({
            "version_id": version,
            "artifact_url": format!("local://storage/{}", relative.display()),
        }))
    }
}

#[async_trait]
impl Delegate for DryRunDelegate {
    async fn handle(&self, request: BridgeRequest) -> Option<BridgeResponse> {
        let Some(kind) = request.kind() else {
            warn!(
                "[DryRunDelegate] Unsupported request type {}",
                request.message_type
            );
            return None;
        };

        let delegate = self.clone();
        let data = request.data.clone();
        let outcome = tokio::task::spawn_blocking(move || delegate.dispatch(kind, &data)).await;

        Some(match outcome {
            Ok(Ok(result)) => request.reply_ok(result),
            Ok(Err(e)) => {
                warn!("[DryRunDelegate] {} failed: {:#}", kind, e);
                request.reply_err(format!("{e:#}"))
            }
            Err(e) => request.reply_err(format!("Dry-run task failed: {e}")),
        })
    }
}

fn deploy(data: &Value) -> Value {
    let project = data["projectName"].as_str().unwrap_or("design-system");
    json!({ "url": format!("https://{project}.vercel.app") })
}

fn str_field<'a>(data: &'a Value, field: &str) -> Result<&'a str> {
    data[field]
        .as_str()
        .filter(|v| !v.is_empty())
        .with_context(|| format!("Request is missing '{field}'"))
}

/// Relative path that cannot escape the output directory
fn safe_relative(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    let escapes = candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    anyhow::ensure!(!escapes && !path.is_empty(), "Refusing to write outside output: {path}");
    Ok(candidate.to_path_buf())
}
