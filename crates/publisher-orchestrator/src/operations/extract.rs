//! Extract and Transform (local)
//!
//! Extraction is naturally batched: an unknown node is skipped and a failed
//! export becomes an empty placeholder, so one bad node never aborts the
//! batch.

use super::{require, PipelineState, StepContext};
use crate::error::Result;
use crate::scene::ExportFormat;
use publisher_types::{DesignBundle, DesignNode};
use tracing::{debug, warn};

const RASTER_SCALE: f64 = 2.0;

pub async fn extract(ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let mut designs = Vec::with_capacity(ctx.config.components.len());

    for node_id in &ctx.config.components {
        let Some(info) = ctx.scene.node(node_id).await else {
            warn!("[extract] Node {} not found, skipping", node_id);
            continue;
        };

        let image_data = match ctx
            .scene
            .export(node_id, ExportFormat::Png { scale: RASTER_SCALE })
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("[extract] Raster export failed for {}: {}", info.name, e);
                Vec::new()
            }
        };
        let svg_data = match ctx.scene.export(node_id, ExportFormat::Svg).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("[extract] Vector export failed for {}: {}", info.name, e);
                String::new()
            }
        };

        designs.push(DesignNode {
            source_url: DesignNode::source_url_for(ctx.scene.file_key(), &info.id),
            id: info.id,
            name: info.name,
            node_type: info.node_type,
            bounds: info.bounds,
            image_data,
            svg_data,
        });
    }

    debug!("[extract] {} of {} nodes extracted", designs.len(), ctx.config.components.len());
    let message = format!("{} componentes extraídos", designs.len());
    state.designs = Some(designs);
    Ok(message)
}

pub async fn transform(ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let designs = require(&state.designs, "extracted designs")?.clone();
    state.bundle = Some(DesignBundle {
        designs,
        file_key: ctx.scene.file_key().to_string(),
        file_name: ctx.scene.file_name().to_string(),
    });
    Ok("Dados de design processados".to_string())
}
