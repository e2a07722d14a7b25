//! Tests for the local template generator and file tree layout

use publisher_orchestrator::codegen::{component_identifier, css_class_name};
use publisher_orchestrator::operations::files::build_file_tree;
use publisher_orchestrator::operations::repository::pull_request_body;
use publisher_orchestrator::{OrchestratorError, TemplateGenerator};
use publisher_types::{
    Bounds, CodeSource, CommitResult, DesignBundle, DesignNode, GeneratedCode, GeneratedComponent,
};

fn node(id: &str, name: &str, width: f64, height: f64) -> DesignNode {
    DesignNode {
        id: id.to_string(),
        name: name.to_string(),
        node_type: "COMPONENT".to_string(),
        bounds: Bounds::new(width, height),
        image_data: Vec::new(),
        svg_data: String::new(),
        source_url: DesignNode::source_url_for("FILE123", id),
    }
}

fn bundle(designs: Vec<DesignNode>) -> DesignBundle {
    DesignBundle {
        designs,
        file_key: "FILE123".to_string(),
        file_name: "Design System".to_string(),
    }
}

#[test]
fn test_name_normalization() {
    assert_eq!(component_identifier("Primary Button / Hover"), "PrimaryButtonHover");
    assert_eq!(component_identifier("Ícone"), "cone");
    assert_eq!(css_class_name("Primary Button"), "primary-button");
}

#[test]
fn test_templates_render_every_format() {
    let generator = TemplateGenerator::new().unwrap();
    let code = generator
        .generate(&bundle(vec![node("1:2", "Primary Button", 120.4, 39.6)]))
        .unwrap();

    assert_eq!(code.source, CodeSource::Template);
    assert_eq!(code.components.len(), 1);
    let component = &code.components[0];
    assert_eq!(component.name, "Primary Button");
    assert!(component.html.contains("<div class=\"primary-button\">"));
    assert!(component.html.contains("120x40"));
    assert!(component
        .react
        .contains("export const PrimaryButton: React.FC<PrimaryButtonProps>"));
    assert!(component.react.contains("./PrimaryButton.module.css"));
    assert!(component.tailwind.contains("min-h-[40px]"));
    assert!(component.css.contains("width: 120px;"));
}

#[test]
fn test_templates_are_deterministic() {
    let generator = TemplateGenerator::new().unwrap();
    let input = bundle(vec![node("1:2", "Card", 320.0, 200.0)]);
    assert_eq!(
        generator.generate(&input).unwrap(),
        generator.generate(&input).unwrap()
    );
}

#[test]
fn test_file_tree_layout() {
    let generator = TemplateGenerator::new().unwrap();
    let code = generator
        .generate(&bundle(vec![
            node("1:2", "Primary Button", 120.0, 40.0),
            node("1:3", "Card", 320.0, 200.0),
        ]))
        .unwrap();

    let tree = build_file_tree(&code).unwrap();
    assert_eq!(tree.count(), 8);
    assert_eq!(
        tree.paths()[..4],
        [
            "src/components/PrimaryButton/PrimaryButton.html",
            "src/components/PrimaryButton/PrimaryButton.tsx",
            "src/components/PrimaryButton/PrimaryButton.tailwind.tsx",
            "src/components/PrimaryButton/PrimaryButton.module.css",
        ]
    );
    assert_eq!(tree.files[4].path, "src/components/Card/Card.html");
    assert_eq!(tree.files[4].content, code.components[1].html);
}

fn component(name: &str) -> GeneratedComponent {
    GeneratedComponent {
        name: name.to_string(),
        html: String::new(),
        react: String::new(),
        tailwind: String::new(),
        css: String::new(),
    }
}

#[test]
fn test_file_tree_rejects_unusable_names() {
    let empty = GeneratedCode {
        components: vec![component("🚀 ✨")],
        source: CodeSource::Delegate,
    };
    assert!(matches!(
        build_file_tree(&empty),
        Err(OrchestratorError::Local(_))
    ));

    let colliding = GeneratedCode {
        components: vec![component("Card"), component("Card!")],
        source: CodeSource::Delegate,
    };
    let err = build_file_tree(&colliding).unwrap_err();
    assert!(err.to_string().contains("src/components/Card"));
}

#[test]
fn test_pull_request_body_lists_files() {
    let generator = TemplateGenerator::new().unwrap();
    let code = generator
        .generate(&bundle(vec![node("1:3", "Card", 320.0, 200.0)]))
        .unwrap();
    let commit = CommitResult {
        hash: "abc123".to_string(),
        branch: "feature/figma-components-1".to_string(),
        message: "feat: Add 4 components from Figma".to_string(),
        files: build_file_tree(&code).unwrap().files,
    };

    let body = pull_request_body(&commit);
    assert!(body.contains("**Branch:** `feature/figma-components-1`"));
    assert!(body.contains("**Files changed:** 4"));
    assert!(body.contains("**Commit:** abc123"));
    assert!(body.contains("- `src/components/Card/Card.module.css`"));
}
