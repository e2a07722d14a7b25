//! Commit and pull request (delegated, halt on failure)

use super::{call_delegate, require, timestamp_ms, PipelineState, StepContext};
use crate::error::{OrchestratorError, Result};
use publisher_types::{BridgeRequestKind, CommitResult, StepKind};
use serde_json::{json, Value};
use tracing::info;

const MISSING_CREDENTIALS: &str = "GitHub credentials missing";
const PR_TITLE: &str = "🎨 Design System Update from Figma";

pub async fn commit(ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let creds = ctx
        .config
        .repository
        .credentials()
        .ok_or_else(|| OrchestratorError::missing_credentials(MISSING_CREDENTIALS))?;
    let tree = require(&state.files, "file tree")?;

    let branch = format!("{}{}", ctx.settings.branch_prefix, timestamp_ms());
    let message = format!("feat: Add {} components from Figma", tree.count());
    let data = json!({
        "githubToken": creds.token,
        "repoOwner": creds.owner,
        "repoName": creds.name,
        "branchName": branch,
        "message": message,
        "files": tree.files,
    });

    let result = call_delegate(ctx, StepKind::Commit, BridgeRequestKind::Commit, data)
        .await?
        .ok_or_else(|| OrchestratorError::local("Git commit has no fallback"))?;
    let hash = string_field(&result, "sha", BridgeRequestKind::Commit)?;

    info!("[commit] {} committed to {}", hash, branch);
    let ledger_message = format!("Commit: {hash}");
    state.commit = Some(CommitResult {
        hash,
        branch,
        message,
        files: tree.files.clone(),
    });
    Ok(ledger_message)
}

pub async fn open_pull_request(ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let creds = ctx
        .config
        .repository
        .credentials()
        .ok_or_else(|| OrchestratorError::missing_credentials(MISSING_CREDENTIALS))?;
    let commit = require(&state.commit, "commit")?;

    let data = json!({
        "title": PR_TITLE,
        "body": pull_request_body(commit),
        "head": commit.branch,
        "base": ctx.config.repository.base_branch(),
        "githubToken": creds.token,
        "repoOwner": creds.owner,
        "repoName": creds.name,
    });

    let result = call_delegate(ctx, StepKind::OpenPr, BridgeRequestKind::PullRequest, data)
        .await?
        .ok_or_else(|| OrchestratorError::local("PR creation has no fallback"))?;
    let url = string_field(&result, "html_url", BridgeRequestKind::PullRequest)?;

    info!("[open-pr] Pull request opened: {}", url);
    state.pr_url = Some(url);
    Ok("PR criado com sucesso".to_string())
}

/// Markdown body listing branch, file count, commit and every file
pub fn pull_request_body(commit: &CommitResult) -> String {
    let files = commit
        .files
        .iter()
        .map(|f| format!("- `{}`", f.path))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "## Automated PR created by Design System Publisher\n\n**Branch:** `{}`\n**Files changed:** {}\n**Commit:** {}\n\n### Components\n{}",
        commit.branch,
        commit.files.len(),
        commit.hash,
        files
    )
}

fn string_field(result: &Value, field: &str, kind: BridgeRequestKind) -> Result<String> {
    result
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| OrchestratorError::MalformedResponse {
            kind,
            detail: format!("missing '{field}'"),
        })
}
