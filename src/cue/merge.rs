//! Grouping of classified elements into same-color runs, and wrapping of
//! multi-element runs under one element.

use tracing::debug;

use crate::dom::{Dom, NodeId, wrap_common_parent};
use crate::error::Result;

use super::classify::ColoredSpan;

/// Consecutive classified elements sharing one color.
///
/// Adjacency is over the classified sequence: unclassified elements in
/// between do not break a run, a classified element of another color does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredRun {
    color: String,
    spans: Vec<ColoredSpan>,
}

impl ColoredRun {
    fn start(span: ColoredSpan) -> Self {
        Self {
            color: span.color.clone(),
            spans: vec![span],
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn spans(&self) -> &[ColoredSpan] {
        &self.spans
    }

    pub fn elements(&self) -> Vec<NodeId> {
        self.spans.iter().map(|s| s.element).collect()
    }

    /// Multi-line summary: color, size, then one line per member.
    pub fn describe(&self, dom: &Dom) -> String {
        let mut out = format!("{} ({})", self.color, self.spans.len());
        for span in &self.spans {
            out.push_str(&format!("\n    {} {}", span.class_name, dom.deep_text(span.element)));
        }
        out
    }
}

enum RunState {
    NoRun,
    OpenRun(ColoredRun),
}

/// Group classified elements into maximal same-color runs.
pub fn group_runs(spans: Vec<ColoredSpan>) -> Vec<ColoredRun> {
    let mut runs = Vec::new();
    let mut state = RunState::NoRun;

    for span in spans {
        state = match state {
            RunState::NoRun => RunState::OpenRun(ColoredRun::start(span)),
            RunState::OpenRun(mut run) if run.color == span.color => {
                run.spans.push(span);
                RunState::OpenRun(run)
            }
            RunState::OpenRun(run) => {
                runs.push(run);
                RunState::OpenRun(ColoredRun::start(span))
            }
        };
    }

    if let RunState::OpenRun(run) = state {
        runs.push(run);
    }
    runs
}

/// Produce the single element that represents a run.
///
/// A one-element run is its own result. Longer runs are wrapped in a new
/// `<span>` placed at their nearest common parent.
pub fn merge_run(dom: &mut Dom, run: &ColoredRun) -> Result<Option<NodeId>> {
    match run.spans.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(single.element)),
        spans => {
            let elements: Vec<NodeId> = spans.iter().map(|s| s.element).collect();
            wrap_common_parent(dom, &elements).map(Some)
        }
    }
}

/// Merge every run, returning the run elements in document order.
pub fn merge_runs(dom: &mut Dom, runs: &[ColoredRun]) -> Result<Vec<NodeId>> {
    let mut merged = Vec::with_capacity(runs.len());
    for run in runs {
        debug!("run {}", run.describe(dom));
        if let Some(element) = merge_run(dom, run)? {
            merged.push(element);
        }
    }
    Ok(merged)
}
