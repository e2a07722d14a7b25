//! Template Code Generator
//!
//! Deterministic local generator used whenever the generation delegate is
//! not configured, reports failure, or does not answer in time. Output
//! depends only on the design bundle.

use crate::error::Result;
use handlebars::Handlebars;
use publisher_types::{CodeSource, DesignBundle, DesignNode, GeneratedCode, GeneratedComponent};
use serde_json::json;
use tracing::{debug, instrument};

pub mod templates;

const HTML_TEMPLATE: &str = "html";
const REACT_TEMPLATE: &str = "react";
const TAILWIND_TEMPLATE: &str = "tailwind";
const CSS_TEMPLATE: &str = "css";

/// Identifier form of a node name: ASCII alphanumerics only
pub fn component_identifier(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// CSS class form of a node name: lowercase, other characters become `-`
pub fn css_class_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct TemplateGenerator {
    handlebars: Handlebars<'static>,
}

impl TemplateGenerator {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_template_string(HTML_TEMPLATE, templates::HTML)?;
        handlebars.register_template_string(REACT_TEMPLATE, templates::REACT)?;
        handlebars.register_template_string(TAILWIND_TEMPLATE, templates::TAILWIND)?;
        handlebars.register_template_string(CSS_TEMPLATE, templates::CSS)?;

        Ok(Self { handlebars })
    }

    /// Generate code for every design in the bundle
    #[instrument(skip(self, bundle), fields(designs = bundle.designs.len()))]
    pub fn generate(&self, bundle: &DesignBundle) -> Result<GeneratedCode> {
        let components = bundle
            .designs
            .iter()
            .map(|design| self.render_component(design))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "[TemplateGenerator] Rendered {} components from templates",
            components.len()
        );
        Ok(GeneratedCode {
            components,
            source: CodeSource::Template,
        })
    }

    fn render_component(&self, design: &DesignNode) -> Result<GeneratedComponent> {
        let context = json!({
            "name": design.name,
            "component": component_identifier(&design.name),
            "class": css_class_name(&design.name),
            "width": design.bounds.width.round() as i64,
            "height": design.bounds.height.round() as i64,
        });

        Ok(GeneratedComponent {
            name: design.name.clone(),
            html: self.handlebars.render(HTML_TEMPLATE, &context)?,
            react: self.handlebars.render(REACT_TEMPLATE, &context)?,
            tailwind: self.handlebars.render(TAILWIND_TEMPLATE, &context)?,
            css: self.handlebars.render(CSS_TEMPLATE, &context)?,
        })
    }
}
