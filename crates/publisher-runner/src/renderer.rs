use ascii_tree::{write_tree, Tree};
use publisher_orchestrator::RunOutcome;
use publisher_types::{Step, StepStatus};

/// Renders the final step list of a run as an ASCII tree
pub fn render_run_as_tree(outcome: &RunOutcome, steps: &[Step]) -> String {
    let root_label = match outcome {
        RunOutcome::Completed {
            run_id,
            pr_url,
            deploy_url,
        } => format!("✅ {run_id}: completed (PR: {pr_url}, deploy: {deploy_url})"),
        RunOutcome::Failed {
            run_id,
            step,
            error,
        } => format!("❌ {run_id}: failed at {step}: {error}"),
        RunOutcome::Cancelled { run_id, at_step } => {
            format!("⏹️ {run_id}: cancelled at {at_step}")
        }
    };

    let step_nodes = steps.iter().map(render_step_node).collect();
    let tree = Tree::Node(root_label.clone(), step_nodes);

    let mut buffer = String::new();
    match write_tree(&mut buffer, &tree) {
        Ok(()) => buffer,
        Err(_) => root_label,
    }
}

fn render_step_node(step: &Step) -> Tree {
    let icon = match step.status {
        StepStatus::Pending => "⏳",
        StepStatus::Running => "🔄",
        StepStatus::Success => "✅",
        StepStatus::Error => "❌",
    };
    let label = format!("{icon} {} [{}]", step.name, step.status);
    let details = step
        .message
        .iter()
        .map(|message| message.to_string())
        .collect::<Vec<_>>();
    Tree::Leaf(std::iter::once(label).chain(details).collect())
}
