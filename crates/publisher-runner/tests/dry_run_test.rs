//! Runs the full pipeline against the dry-run delegate

use publisher_orchestrator::{
    serve, BridgeChannel, Delegate, EventSink, InMemorySceneGraph, OrchestratorSettings,
    RunOutcome, SceneGraph, WorkflowOrchestrator,
};
use publisher_runner::renderer::render_run_as_tree;
use publisher_runner::{load_config, load_scene, ControlCommand, DryRunDelegate};
use publisher_types::{BridgeRequest, BridgeRequestKind, Step, StepKind};
use rstest::rstest;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_fixtures(dir: &Path, config: serde_json::Value) -> anyhow::Result<()> {
    let scene = json!({
        "fileKey": "FILE123",
        "fileName": "Design System",
        "nodes": [
            {
                "id": "1:2",
                "name": "Primary Button",
                "type": "COMPONENT",
                "bounds": { "width": 120.0, "height": 40.0 },
                "png": [137, 80, 78, 71],
                "svg": "<svg/>"
            },
            {
                "id": "1:3",
                "name": "Card",
                "type": "FRAME",
                "bounds": { "width": 320.0, "height": 200.0 }
            }
        ]
    });
    fs::write(dir.join("scene.json"), serde_json::to_vec(&scene)?)?;
    fs::write(dir.join("config.json"), serde_json::to_vec(&config)?)?;
    Ok(())
}

async fn run_dry(dir: &Path) -> anyhow::Result<RunOutcome> {
    let snapshot = load_scene(&dir.join("scene.json"))?;
    let config = load_config(&dir.join("config.json"))?;
    let scene: Arc<dyn SceneGraph> = Arc::new(InMemorySceneGraph::from_snapshot(snapshot));

    let (bridge, endpoint) = BridgeChannel::new();
    let orchestrator = WorkflowOrchestrator::new(
        bridge,
        scene,
        OrchestratorSettings::headless(),
        EventSink::disabled(),
    )?;
    serve(endpoint, Arc::new(DryRunDelegate::new(dir.join("out"))));

    Ok(orchestrator.run(config).await)
}

#[tokio::test]
async fn test_dry_run_writes_repository_and_catalog() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(
        temp_dir.path(),
        json!({
            "components": ["1:2", "1:3"],
            "generation": { "apiKey": "sk-dry" },
            "repository": { "token": "ghp", "owner": "acme", "name": "design-system" },
            "catalog": { "email": "dev@acme.io", "projectId": "proj-1", "version": "v1" },
            "deploy": { "token": "vercel" }
        }),
    )?;

    let outcome = run_dry(temp_dir.path()).await?;
    let RunOutcome::Completed {
        pr_url, deploy_url, ..
    } = &outcome
    else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(pr_url, "https://github.com/acme/design-system/pull/dry-run");
    assert_eq!(deploy_url, "https://design-system.vercel.app");

    let out = temp_dir.path().join("out");
    let catalog = out.join("catalog/proj-1/v1.json");
    let stored: serde_json::Value = serde_json::from_slice(&fs::read(catalog)?)?;
    assert_eq!(stored["components"].as_array().unwrap().len(), 2);
    assert_eq!(stored["metadata"]["fileKey"], "FILE123");

    let branches: Vec<_> = fs::read_dir(out.join("repository/feature"))?.collect();
    assert_eq!(branches.len(), 1);
    let branch = branches[0].as_ref().unwrap().path();
    let html = fs::read_to_string(branch.join("src/components/Card/Card.html"))?;
    assert!(html.contains("<title>Card</title>"), "templates used after codegen refusal");
    assert!(branch.join("PULL_REQUEST.md").exists());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_without_repository_fails_at_commit() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write_fixtures(temp_dir.path(), json!({ "components": ["1:2"] }))?;

    let outcome = run_dry(temp_dir.path()).await?;
    assert!(matches!(
        &outcome,
        RunOutcome::Failed { step: StepKind::Commit, error, .. } if error == "GitHub credentials missing"
    ));
    assert!(!temp_dir.path().join("out/repository").exists());
    Ok(())
}

#[rstest]
#[case::absolute(None)]
#[case::parent_dir(Some("../../escaped"))]
#[tokio::test]
async fn test_commit_refuses_branch_outside_output(
    #[case] branch: Option<&str>,
) -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let elsewhere = TempDir::new()?;
    let branch = match branch {
        Some(relative) => relative.to_string(),
        None => elsewhere.path().join("evil-123").display().to_string(),
    };
    let delegate = DryRunDelegate::new(temp_dir.path().join("out"));

    let commit = BridgeRequest::new(
        BridgeRequestKind::Commit,
        json!({
            "branchName": branch,
            "files": [{ "path": "src/a.txt", "content": "x" }],
        }),
    );
    let response = delegate.handle(commit).await.expect("commit reply");
    assert!(!response.success);
    assert!(response
        .error
        .as_deref()
        .is_some_and(|e| e.contains("Refusing to write outside output")));

    let pull_request = BridgeRequest::new(
        BridgeRequestKind::PullRequest,
        json!({
            "repoOwner": "acme",
            "repoName": "design-system",
            "head": branch,
            "body": "body",
        }),
    );
    let response = delegate.handle(pull_request).await.expect("pull request reply");
    assert!(!response.success);

    assert!(!elsewhere.path().join("evil-123").exists());
    assert!(!temp_dir.path().join("escaped").exists());
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json")?;

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid workflow config"));
    Ok(())
}

#[rstest]
#[case("pause", Some(ControlCommand::Pause))]
#[case(" Resume\n", Some(ControlCommand::Resume))]
#[case("CANCEL", Some(ControlCommand::Cancel))]
#[case("stop", None)]
fn test_control_command_parsing(#[case] input: &str, #[case] expected: Option<ControlCommand>) {
    assert_eq!(input.parse::<ControlCommand>().ok(), expected);
}

#[test]
fn test_render_failed_run() {
    let mut steps = Step::pipeline();
    steps[0].status = publisher_types::StepStatus::Error;
    steps[0].message = Some("boom".to_string());

    let outcome = RunOutcome::Failed {
        run_id: uuid::Uuid::nil(),
        step: StepKind::Extract,
        error: "boom".to_string(),
    };
    let rendered = render_run_as_tree(&outcome, &steps);
    assert!(rendered.contains("failed at extract: boom"));
    assert!(rendered.contains("[error]"));
    assert!(rendered.contains("[pending]"));
}
