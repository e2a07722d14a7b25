//! Shared fixtures for orchestrator integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use publisher_orchestrator::{
    serve, BridgeChannel, BridgeRequest, BridgeRequestKind, BridgeResponse, Delegate, EventSink,
    InMemorySceneGraph, OrchestratorSettings, PolicyTable, SceneGraph, StepStatus,
    WorkflowConfig, WorkflowController, WorkflowEvent, WorkflowOrchestrator,
};
use publisher_types::{CatalogTarget, DeployTarget, GenerationTarget, RepositoryTarget};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const FILE_KEY: &str = "FILE123";
pub const FILE_NAME: &str = "Design System";
pub const PR_URL: &str = "https://github.com/acme/design-system/pull/42";
pub const DEPLOY_URL: &str = "https://design-system.vercel.app";
pub const COMMIT_SHA: &str = "abc123def";

/// Scripted delegate reply
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(Value),
    Fail(String),
    Silent,
    After(Duration, Box<Reply>),
}

impl Reply {
    pub fn fail(message: &str) -> Self {
        Reply::Fail(message.to_string())
    }

    pub fn after(ms: u64, reply: Reply) -> Self {
        Reply::After(Duration::from_millis(ms), Box::new(reply))
    }
}

/// Control command a delegate issues when it receives a given request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interjection {
    Pause,
    Cancel,
}

/// Delegate answering from a per-kind script, with realistic defaults
#[derive(Default)]
pub struct ScriptedDelegate {
    script: Mutex<HashMap<BridgeRequestKind, VecDeque<Reply>>>,
    interjections: Mutex<HashMap<BridgeRequestKind, Interjection>>,
    controller: OnceLock<Arc<WorkflowController>>,
    received: Mutex<Vec<BridgeRequest>>,
}

impl ScriptedDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for the next request of `kind`
    pub fn then(self, kind: BridgeRequestKind, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(reply);
        self
    }

    /// Issue `action` on the controller when a request of `kind` arrives
    pub fn interject(self, kind: BridgeRequestKind, action: Interjection) -> Self {
        self.interjections.lock().unwrap().insert(kind, action);
        self
    }

    pub fn attach(&self, controller: Arc<WorkflowController>) {
        let _ = self.controller.set(controller);
    }

    pub fn received(&self) -> Vec<BridgeRequest> {
        self.received.lock().unwrap().clone()
    }

    pub fn received_of(&self, kind: BridgeRequestKind) -> Vec<BridgeRequest> {
        self.received()
            .into_iter()
            .filter(|r| r.kind() == Some(kind))
            .collect()
    }

    pub fn count(&self, kind: BridgeRequestKind) -> usize {
        self.received_of(kind).len()
    }
}

#[async_trait]
impl Delegate for ScriptedDelegate {
    async fn handle(&self, request: BridgeRequest) -> Option<BridgeResponse> {
        self.received.lock().unwrap().push(request.clone());
        let kind = request.kind()?;

        let interjection = self.interjections.lock().unwrap().get(&kind).copied();
        if let (Some(action), Some(controller)) = (interjection, self.controller.get()) {
            match action {
                Interjection::Pause => {
                    controller.pause().await;
                }
                Interjection::Cancel => {
                    controller.cancel().await;
                }
            }
        }

        let scripted = self
            .script
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        let mut reply = scripted.unwrap_or_else(|| default_reply(kind, &request));

        loop {
            match reply {
                Reply::After(delay, next) => {
                    tokio::time::sleep(delay).await;
                    reply = *next;
                }
                Reply::Ok(result) => return Some(request.reply_ok(result)),
                Reply::Fail(message) => return Some(request.reply_err(message)),
                Reply::Silent => return None,
            }
        }
    }
}

fn default_reply(kind: BridgeRequestKind, request: &BridgeRequest) -> Reply {
    let result = match kind {
        BridgeRequestKind::Codegen => {
            let components: Vec<Value> = request.data["designs"]
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .map(|design| {
                    let name = design["name"].as_str().unwrap_or_default();
                    json!({
                        "name": name,
                        "html": format!("<div>{name}</div>"),
                        "react": format!("export const C = () => <div>{name}</div>;"),
                        "tailwind": format!("<div className=\"p-4\">{name}</div>"),
                        "css": ".container { display: flex; }",
                    })
                })
                .collect();
            Value::Array(components)
        }
        BridgeRequestKind::Commit => json!({ "sha": COMMIT_SHA }),
        BridgeRequestKind::PullRequest => json!({ "html_url": PR_URL }),
        BridgeRequestKind::Deploy => json!({ "url": DEPLOY_URL }),
        BridgeRequestKind::CatalogPublish => json!({
            "version_id": request.data["version"],
            "artifact_url": format!(
                "https://catalog.local/{}/{}.json",
                request.data["projectId"].as_str().unwrap_or_default(),
                request.data["version"].as_str().unwrap_or_default()
            ),
        }),
    };
    Reply::Ok(result)
}

/// Two exportable component nodes
pub fn design_scene() -> InMemorySceneGraph {
    InMemorySceneGraph::new(FILE_KEY, FILE_NAME)
        .with_node("1:2", "Primary Button", 120.0, 40.0)
        .with_node("1:3", "Card", 320.4, 199.6)
}

/// Every target configured
pub fn full_config() -> WorkflowConfig {
    WorkflowConfig::new(vec!["1:2".to_string(), "1:3".to_string()])
        .with_generation(GenerationTarget::with_api_key("sk-test"))
        .with_repository(RepositoryTarget::new("ghp_test", "acme", "design-system"))
        .with_catalog(CatalogTarget::new("dev@acme.io", "proj-1"))
        .with_deploy(DeployTarget::with_token("vercel-test"))
}

pub struct Harness {
    pub orchestrator: Arc<WorkflowOrchestrator>,
    pub controller: Arc<WorkflowController>,
    pub delegate: Arc<ScriptedDelegate>,
    pub events: mpsc::UnboundedReceiver<WorkflowEvent>,
}

impl Harness {
    /// Every notification emitted so far
    pub fn drain(&mut self) -> Vec<WorkflowEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

pub fn harness(delegate: ScriptedDelegate) -> Harness {
    harness_with(delegate, design_scene(), |policies| policies)
}

pub fn harness_with<F>(delegate: ScriptedDelegate, scene: InMemorySceneGraph, policies: F) -> Harness
where
    F: FnOnce(PolicyTable) -> PolicyTable,
{
    init_tracing();
    let settings = OrchestratorSettings::headless();
    let (bridge, endpoint) = BridgeChannel::new();
    let (sink, events) = EventSink::channel();
    let scene: Arc<dyn SceneGraph> = Arc::new(scene);

    let orchestrator = WorkflowOrchestrator::new(bridge, scene, settings.clone(), sink)
        .expect("orchestrator should build")
        .with_policies(policies(PolicyTable::from_settings(&settings)));
    let controller = orchestrator.controller();

    let delegate = Arc::new(delegate);
    delegate.attach(controller.clone());
    serve(endpoint, delegate.clone());

    Harness {
        orchestrator: Arc::new(orchestrator),
        controller,
        delegate,
        events,
    }
}

/// `(step id, status)` of every step-updated notification for `run_id`
pub fn step_updates(events: &[WorkflowEvent], run_id: Uuid) -> Vec<(String, StepStatus)> {
    events
        .iter()
        .filter_map(|event| match event {
            WorkflowEvent::StepUpdated { run_id: id, step } if *id == run_id => {
                Some((step.id.clone(), step.status))
            }
            _ => None,
        })
        .collect()
}

/// Wire names of the notifications, in order
pub fn event_types(events: &[WorkflowEvent]) -> Vec<&'static str> {
    events.iter().map(WorkflowEvent::event_type).collect()
}

/// Poll `condition` for up to two seconds
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
