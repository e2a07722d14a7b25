//! Catalog publishing (delegated, skipped when not configured)

use super::{call_delegate, require, timestamp_ms, PipelineState, StepContext};
use crate::error::{OrchestratorError, Result};
use publisher_types::{
    BridgeRequestKind, CatalogOutcome, CatalogPublication, DesignBundle, GeneratedCode, StepKind,
};
use serde_json::{json, Value};
use tracing::info;

const SOURCE_TAG: &str = "figma-plugin";

pub async fn publish(ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let outcome = publish_to_catalog(ctx, state).await?;
    let message = match &outcome {
        CatalogOutcome::Skipped => "Ignorado (não configurado)".to_string(),
        CatalogOutcome::Published(publication) => {
            format!("Publicado no catálogo ({})", publication.version_id)
        }
    };
    state.catalog = Some(outcome);
    Ok(message)
}

async fn publish_to_catalog(
    ctx: &StepContext<'_>,
    state: &PipelineState,
) -> Result<CatalogOutcome> {
    let catalog = &ctx.config.catalog;
    if !catalog.is_configured() {
        info!("[catalog] No catalog project configured, skipping publish");
        return Ok(CatalogOutcome::Skipped);
    }

    let bundle = require(&state.bundle, "design bundle")?;
    let code = require(&state.code, "generated code")?;
    let version = catalog
        .explicit_version()
        .map(str::to_string)
        .unwrap_or_else(|| format!("v{}", timestamp_ms()));

    let data = json!({
        "baseUrl": catalog.base_url(),
        "email": catalog.email,
        "projectId": catalog.project_id,
        "version": version,
        "payload": catalog_payload(bundle, code),
        "set_default": catalog.set_default,
    });

    let result = call_delegate(
        ctx,
        StepKind::PublishToCatalog,
        BridgeRequestKind::CatalogPublish,
        data,
    )
    .await?
    .ok_or_else(|| OrchestratorError::local("Catalog publish has no fallback"))?;

    let publication: CatalogPublication =
        serde_json::from_value(result).map_err(|e| OrchestratorError::MalformedResponse {
            kind: BridgeRequestKind::CatalogPublish,
            detail: e.to_string(),
        })?;
    info!(
        "[catalog] Published version {} at {}",
        publication.version_id, publication.artifact_url
    );
    Ok(CatalogOutcome::Published(publication))
}

/// `{components[], metadata}` body stored by the hosting backend
pub fn catalog_payload(bundle: &DesignBundle, code: &GeneratedCode) -> Value {
    let components: Vec<Value> = code
        .components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            let design = bundle.designs.get(index);
            json!({
                "name": component.name,
                "type": design.map(|d| d.node_type.as_str()),
                "html": component.html,
                "react": component.react,
                "tailwind": component.tailwind,
                "css": component.css,
                "svgData": design.map(|d| d.svg_data.as_str()),
                "figmaUrl": design.map(|d| d.source_url.as_str()),
                "bounds": design.map(|d| d.bounds),
            })
        })
        .collect();

    json!({
        "components": components,
        "metadata": {
            "fileKey": bundle.file_key,
            "fileName": bundle.file_name,
            "source": SOURCE_TAG,
        }
    })
}
