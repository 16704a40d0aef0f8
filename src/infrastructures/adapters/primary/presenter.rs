//! Text rendering of run listings and deletion reports.

use crate::application::use_cases::delete_workflow_runs::DeletionReport;
use crate::domain::models::run::WorkflowRun;
use colored::Colorize;

const TITLE_WIDTH: usize = 32;
const NAME_WIDTH: usize = 24;
const BRANCH_WIDTH: usize = 16;

/// Renders runs as a numbered table, in the order given.
#[must_use]
pub fn render_runs(runs: &[WorkflowRun]) -> Vec<String> {
    let header = format!(
        "{:>4}  {:<12} {:<10} {:<NAME_WIDTH$} {:<TITLE_WIDTH$} {:<BRANCH_WIDTH$} {:<16} {}",
        "No.", "Run ID", "Workflow", "Name", "Title", "Branch", "State", "Created At"
    );
    let mut lines = vec![header.bold().to_string(), "=".repeat(header.len())];

    for (i, run) in runs.iter().enumerate() {
        lines.push(format!(
            "{:>4}  {:<12} {:<10} {:<NAME_WIDTH$} {:<TITLE_WIDTH$} {:<BRANCH_WIDTH$} {} {}",
            i + 1,
            run.id,
            run.workflow_id,
            truncate(&run.name, NAME_WIDTH),
            truncate(&run.display_title, TITLE_WIDTH),
            truncate(run.head_branch.as_deref().unwrap_or("-"), BRANCH_WIDTH),
            paint_state(run.state()),
            run.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ));
    }
    lines
}

/// Lists each workflow with its run count, in order of first appearance.
/// Empty when all runs belong to a single workflow.
#[must_use]
pub fn render_workflow_summary(runs: &[WorkflowRun]) -> Vec<String> {
    let mut workflows: Vec<(u64, &str, usize)> = Vec::new();
    for run in runs {
        match workflows.iter_mut().find(|(id, _, _)| *id == run.workflow_id) {
            Some((_, _, count)) => *count += 1,
            None => workflows.push((run.workflow_id, run.name.as_str(), 1)),
        }
    }
    if workflows.len() < 2 {
        return Vec::new();
    }

    let mut lines = vec![String::new(), "Workflows:".bold().to_string()];
    lines.extend(
        workflows
            .into_iter()
            .map(|(id, name, count)| format!("  {id:<10} {name} ({count} runs)")),
    );
    lines
}

#[must_use]
pub fn render_report(report: &DeletionReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(()) => format!("{} workflow run {}", "Deleted".green(), outcome.run_id),
            Err(e) => format!(
                "{} to delete workflow run {}: {}",
                "Failed".red(),
                outcome.run_id,
                e
            ),
        })
        .collect();

    lines.push(format!(
        "{} deleted, {} failed",
        report.succeeded().count(),
        report.failed().count()
    ));
    lines
}

fn paint_state(state: &str) -> String {
    let padded = format!("{state:<16}");
    match state {
        "success" => padded.green().to_string(),
        "failure" | "cancelled" | "timed_out" | "startup_failure" => padded.red().to_string(),
        "skipped" | "neutral" | "stale" => padded.dimmed().to_string(),
        _ => padded.yellow().to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
