//! Hosting deploy configuration (delegated when a token is configured)

use super::{call_delegate, PipelineState, StepContext};
use crate::error::{OrchestratorError, Result};
use publisher_types::{BridgeRequestKind, StepKind};
use serde_json::{json, Value};
use tracing::info;

const IMPORT_URL: &str = "https://vercel.com/new/import?repository=";
const PROJECT_URL: &str = "https://vercel.com/";

pub async fn configure(ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let repository = &ctx.config.repository;
    let slug = repository.slug();

    let Some(token) = ctx.config.deploy.token() else {
        info!("[deploy] No deploy token configured, reporting import URL");
        state.deploy_url = Some(format!("{IMPORT_URL}{slug}"));
        return Ok("Deploy configurado".to_string());
    };

    let deploy = &ctx.config.deploy;
    let data = json!({
        "vercelToken": token,
        "projectName": repository.name,
        "framework": deploy.framework,
        "buildCommand": deploy.build_command,
        "outputDirectory": deploy.output_directory,
        "githubRepo": slug,
        "prUrl": state.pr_url,
    });

    let result = call_delegate(ctx, StepKind::ConfigureDeploy, BridgeRequestKind::Deploy, data)
        .await?
        .ok_or_else(|| OrchestratorError::local("Deploy configuration has no fallback"))?;
    let url = result
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{PROJECT_URL}{slug}"));

    info!("[deploy] Deploy configured at {}", url);
    state.deploy_url = Some(url);
    Ok("Deploy configurado".to_string())
}
