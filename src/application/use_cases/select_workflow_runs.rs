use crate::domain::models::run::WorkflowRun;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use thiserror::Error;

/// What the user asked to delete, before it is checked against a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionRequest {
    Nothing,
    All,
    /// 1-based position ranges in the displayed listing. A single position
    /// is a one-element range.
    Positions(Vec<RangeInclusive<usize>>),
    RunIds(Vec<u64>),
    /// Every listed run of the given workflow.
    Workflow(u64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("invalid selection `{0}`")]
    Invalid(String),

    #[error("position {position} is out of range (1-{len})")]
    OutOfRange { position: usize, len: usize },

    #[error("run {0} is not among the listed runs")]
    UnknownRun(u64),
}

/// Run ids chosen for deletion, in listing order and without duplicates.
///
/// Only [`resolve_selection`] builds one, so every id belongs to the listing
/// it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    run_ids: Vec<u64>,
}

impl Selection {
    #[must_use]
    pub fn run_ids(&self) -> &[u64] {
        &self.run_ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.run_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.run_ids.is_empty()
    }
}

/// Parses interactive input: `all`, `workflow <id>`, a list of positions
/// such as `1,3,5-7`, or an empty line / `q` / `n` for nothing.
///
/// # Errors
///
/// Returns [`SelectionError::Invalid`] when the input matches none of these.
pub fn parse_selection(input: &str) -> Result<SelectionRequest, SelectionError> {
    let trimmed = input.trim();
    let invalid = || SelectionError::Invalid(trimmed.to_string());

    let lowered = trimmed.to_ascii_lowercase();
    match lowered.as_str() {
        "" | "q" | "n" | "none" => return Ok(SelectionRequest::Nothing),
        "a" | "all" => return Ok(SelectionRequest::All),
        _ => {}
    }

    let workflow_arg = lowered
        .strip_prefix("workflow")
        .or_else(|| lowered.strip_prefix('w'))
        .map(|rest| rest.trim_start_matches([':', ' ']).trim());
    if let Some(arg) = workflow_arg {
        return arg
            .parse::<u64>()
            .map(SelectionRequest::Workflow)
            .map_err(|_| invalid());
    }

    let mut positions = Vec::new();
    for part in trimmed.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: usize = start.trim().parse().map_err(|_| invalid())?;
                let end: usize = end.trim().parse().map_err(|_| invalid())?;
                if start > end {
                    return Err(invalid());
                }
                positions.push(start..=end);
            }
            None => {
                let position: usize = part.parse().map_err(|_| invalid())?;
                positions.push(position..=position);
            }
        }
    }
    if positions.is_empty() {
        return Err(invalid());
    }
    Ok(SelectionRequest::Positions(positions))
}

/// Resolves `request` against `runs`, the listing shown to the user.
///
/// # Errors
///
/// Fails when a position is out of range or a run id is not listed. A
/// workflow without listed runs resolves to an empty selection.
pub fn resolve_selection(
    request: &SelectionRequest,
    runs: &[WorkflowRun],
) -> Result<Selection, SelectionError> {
    let chosen: HashSet<u64> = match request {
        SelectionRequest::Nothing => HashSet::new(),
        SelectionRequest::All => runs.iter().map(|run| run.id).collect(),
        SelectionRequest::Workflow(workflow_id) => runs
            .iter()
            .filter(|run| run.workflow_id == *workflow_id)
            .map(|run| run.id)
            .collect(),
        SelectionRequest::Positions(ranges) => {
            let mut chosen = HashSet::new();
            for range in ranges {
                let (start, end) = (*range.start(), *range.end());
                if let Some(position) = [start, end]
                    .into_iter()
                    .find(|&position| position == 0 || position > runs.len())
                {
                    return Err(SelectionError::OutOfRange {
                        position,
                        len: runs.len(),
                    });
                }
                let listed = runs.get(start - 1..end).unwrap_or_default();
                chosen.extend(listed.iter().map(|run| run.id));
            }
            chosen
        }
        SelectionRequest::RunIds(run_ids) => {
            let listed: HashSet<u64> = runs.iter().map(|run| run.id).collect();
            if let Some(&unknown) = run_ids.iter().find(|id| !listed.contains(id)) {
                return Err(SelectionError::UnknownRun(unknown));
            }
            run_ids.iter().copied().collect()
        }
    };

    let run_ids = runs
        .iter()
        .map(|run| run.id)
        .filter(|id| chosen.contains(id))
        .collect();
    Ok(Selection { run_ids })
}
