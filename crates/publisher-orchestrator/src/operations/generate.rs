//! Code generation (delegated, falls back to templates)

use super::{call_delegate_as, require, PipelineState, StepContext};
use crate::error::Result;
use publisher_types::{
    BridgeRequestKind, CodeSource, DesignBundle, GeneratedCode, GeneratedComponent, StepKind,
};
use serde_json::json;
use tracing::{info, warn};

pub async fn generate(ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let bundle = require(&state.bundle, "design bundle")?;
    let code = generate_code(ctx, bundle).await?;
    state.code = Some(code);
    Ok("Código gerado em 3 formatos".to_string())
}

async fn generate_code(ctx: &StepContext<'_>, bundle: &DesignBundle) -> Result<GeneratedCode> {
    let generation = &ctx.config.generation;
    let api_key = match generation.api_key.as_deref() {
        Some(key) if generation.is_configured() => key,
        _ => {
            info!("[generate] No generation key configured, using templates");
            return ctx.generator.generate(bundle);
        }
    };

    info!(
        "[generate] Requesting code for {} components from delegate",
        bundle.designs.len()
    );
    let data = json!({
        "apiKey": api_key,
        "fileKey": bundle.file_key,
        "fileName": bundle.file_name,
        "designs": bundle.designs,
    });

    let components = call_delegate_as::<Vec<GeneratedComponent>>(
        ctx,
        StepKind::Generate,
        BridgeRequestKind::Codegen,
        data,
    )
    .await?;

    match components {
        Some(components) => Ok(GeneratedCode {
            components,
            source: CodeSource::Delegate,
        }),
        None => {
            warn!("[generate] Delegate code unavailable, using templates");
            ctx.generator.generate(bundle)
        }
    }
}
