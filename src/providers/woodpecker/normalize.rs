use crate::status::{Pipeline, Step};

use super::types::{RawPipeline, RawPipelineDetail};

/// Length of the abbreviated commit SHA shown in the widget.
const SHORT_SHA_LEN: usize = 7;

/// Normalizes a raw pipeline record.
///
/// A missing record stays missing: a repository that never built has no
/// pipeline rather than a zero-valued one.
pub fn normalize_pipeline(raw: Option<RawPipeline>) -> Option<Pipeline> {
    let raw = raw?;

    let started = raw.started.unwrap_or(0);
    let finished = raw.finished.unwrap_or(0);

    Some(Pipeline {
        id: raw.id.unwrap_or(0),
        number: raw.number.unwrap_or(0),
        status: raw.status.unwrap_or_default(),
        event: raw.event.unwrap_or_default(),
        branch: raw.branch.unwrap_or_default(),
        message: first_line(raw.message.as_deref().unwrap_or_default()),
        author: raw
            .author
            .filter(|author| !author.is_empty())
            .or(raw.sender)
            .unwrap_or_default(),
        commit: short_sha(raw.commit.as_deref().unwrap_or_default()),
        created: raw.created.unwrap_or(0),
        started,
        finished,
        duration: duration(started, finished),
        steps: Vec::new(),
    })
}

/// Flattens the workflow tree of a pipeline into its steps, in encounter order.
pub fn flatten_steps(detail: RawPipelineDetail) -> Vec<Step> {
    detail
        .workflows
        .unwrap_or_default()
        .into_iter()
        .flat_map(|workflow| workflow.children.unwrap_or_default())
        .map(|child| Step {
            name: child.name.unwrap_or_default(),
            state: child.state.unwrap_or_default(),
            kind: child.kind.unwrap_or_default(),
        })
        .collect()
}

fn first_line(message: &str) -> String {
    message.split('\n').next().unwrap_or_default().to_string()
}

fn short_sha(commit: &str) -> String {
    commit.chars().take(SHORT_SHA_LEN).collect()
}

fn duration(started: i64, finished: i64) -> i64 {
    if started == 0 || finished == 0 {
        0
    } else {
        // Out-of-range timestamps count as unknown.
        finished.checked_sub(started).unwrap_or(0)
    }
}
