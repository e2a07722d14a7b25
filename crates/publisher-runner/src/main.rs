use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use publisher_orchestrator::{
    serve, BridgeChannel, EventSink, InMemorySceneGraph, OrchestratorSettings, ProgressTracker,
    RunOutcome, SceneGraph, WorkflowEvent, WorkflowOrchestrator,
};
use publisher_runner::{load_config, load_scene, renderer, ControlCommand, DryRunDelegate};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

/// Publish design components through the workflow engine using a local dry-run delegate.
///
/// Notifications are written to stdout as JSON lines. Type `pause`, `resume`
/// or `cancel` on stdin to control the run.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Scene snapshot JSON (file key, file name and nodes with exports)
    #[arg(long)]
    scene: PathBuf,

    /// Workflow configuration JSON
    #[arg(long)]
    config: PathBuf,

    /// Directory the dry-run delegate writes commits and catalog versions to
    #[arg(long, default_value = "publish-output")]
    output: PathBuf,

    /// Override the settling delay after each step transition
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Override the code generation timeout
    #[arg(long)]
    codegen_timeout_secs: Option<u64>,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,publisher_orchestrator=debug,publisher_runner=debug"));
    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set global default tracing subscriber")
}

fn print_event(tracker: &mut ProgressTracker, event: &WorkflowEvent) -> Result<()> {
    tracker.apply(event);
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing()?;
    let cli = Cli::parse();

    let mut settings = OrchestratorSettings::from_env()?;
    if let Some(ms) = cli.settle_ms {
        settings = settings.with_settle_delay(Duration::from_millis(ms));
    }
    if let Some(secs) = cli.codegen_timeout_secs {
        settings.codegen_timeout = Duration::from_secs(secs);
    }

    let scene: Arc<dyn SceneGraph> =
        Arc::new(InMemorySceneGraph::from_snapshot(load_scene(&cli.scene)?));
    let config = load_config(&cli.config)?;

    let (bridge, endpoint) = BridgeChannel::new();
    let (sink, mut events) = EventSink::channel();
    let orchestrator = WorkflowOrchestrator::new(bridge, scene, settings, sink)?;
    let controller = orchestrator.controller();
    let delegate = Arc::new(DryRunDelegate::new(&cli.output));
    let _server = serve(endpoint, delegate);

    info!(
        "[publisher-runner] Publishing {} components, output in {}",
        config.components.len(),
        cli.output.display()
    );

    let mut tracker = ProgressTracker::new();
    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let run = orchestrator.run(config);
    tokio::pin!(run);
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            Some(event) = events.recv() => print_event(&mut tracker, &event)?,
            line = commands.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<ControlCommand>() {
                    Ok(command) => command.apply(&controller).await,
                    Err(e) => warn!("[publisher-runner] {}", e),
                },
                Ok(None) | Err(_) => stdin_open = false,
            },
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&mut tracker, &event)?;
    }

    eprintln!("{}", renderer::render_run_as_tree(&outcome, tracker.steps()));

    match outcome {
        RunOutcome::Failed { step, error, .. } => {
            anyhow::bail!("Workflow failed at {step}: {error}")
        }
        _ => Ok(()),
    }
}
