//! File tree materialization (local)
//!
//! Not batched: a component that cannot be laid out halts the run.

use super::{require, PipelineState, StepContext};
use crate::codegen::component_identifier;
use crate::error::{OrchestratorError, Result};
use publisher_types::{FileEntry, FileTree, GeneratedCode};
use std::collections::HashSet;

pub async fn write_files(_ctx: &StepContext<'_>, state: &mut PipelineState) -> Result<String> {
    let code = require(&state.code, "generated code")?;
    let tree = build_file_tree(code)?;
    let message = format!("{} arquivos criados", tree.count());
    state.files = Some(tree);
    Ok(message)
}

/// Four files per component under `src/components/{Name}/`
pub fn build_file_tree(code: &GeneratedCode) -> Result<FileTree> {
    let mut files = Vec::with_capacity(code.components.len() * 4);
    let mut seen = HashSet::new();

    for component in &code.components {
        let safe_name = component_identifier(&component.name);
        if safe_name.is_empty() {
            return Err(OrchestratorError::local(format!(
                "Component '{}' has no usable file name",
                component.name
            )));
        }
        if !seen.insert(safe_name.clone()) {
            return Err(OrchestratorError::local(format!(
                "Components collide on path src/components/{safe_name}"
            )));
        }

        let dir = format!("src/components/{safe_name}");
        files.push(FileEntry {
            path: format!("{dir}/{safe_name}.html"),
            content: component.html.clone(),
        });
        files.push(FileEntry {
            path: format!("{dir}/{safe_name}.tsx"),
            content: component.react.clone(),
        });
        files.push(FileEntry {
            path: format!("{dir}/{safe_name}.tailwind.tsx"),
            content: component.tailwind.clone(),
        });
        files.push(FileEntry {
            path: format!("{dir}/{safe_name}.module.css"),
            content: component.css.clone(),
        });
    }

    Ok(FileTree { files })
}
