//! Cue elements: highlighted runs turned into elements with fragment ids.
//!
//! Fragment ids are the join key between the XHTML chapter and its Media
//! Overlay: cue `n` (1-based, document order) is `f{n:06}` and is narrated
//! by clip `n`.

mod classify;
mod merge;

pub use classify::{CUE_TAGS, ColoredSpan, classify};
pub use merge::{ColoredRun, group_runs, merge_run, merge_runs};

use tracing::debug;

use crate::dom::{Dom, NodeId};
use crate::error::Result;
use crate::style::StyleRule;

/// Literal id used by hand-prepared chapters before numbering.
pub const PLACEHOLDER_ID: &str = "f000000";

/// Fragment id for the cue at zero-based `index`.
pub fn fragment_id(index: usize) -> String {
    format!("f{:06}", index + 1)
}

/// Check whether an id is a generated fragment id (`f000001` and up).
pub fn is_fragment_id(id: &str) -> bool {
    id.len() == 7
        && id.starts_with('f')
        && id[1..].bytes().all(|b| b.is_ascii_digit())
        && &id[1..] != "000000"
}

/// Assign sequential fragment ids to `elements` in the given order.
pub fn identify(dom: &mut Dom, elements: &[NodeId]) {
    for (index, &element) in elements.iter().enumerate() {
        dom.set_attr(element, "id", &fragment_id(index));
    }
}

/// Classify, group, merge and identify highlighted text in one go.
///
/// Returns the cue elements in document order.
pub fn mark_cues(dom: &mut Dom, rules: &[StyleRule]) -> Result<Vec<NodeId>> {
    let spans = classify(dom, rules);
    let runs = group_runs(spans);
    debug!(runs = runs.len(), "grouped highlighted runs");

    let cues = merge_runs(dom, &runs)?;
    identify(dom, &cues);
    Ok(cues)
}

/// Elements carrying a generated fragment id, in document order.
pub fn cue_elements(dom: &Dom) -> Vec<NodeId> {
    dom.descendants(dom.document())
        .filter(|&id| dom.element_id(id).is_some_and(is_fragment_id))
        .collect()
}

/// Replace each [`PLACEHOLDER_ID`] occurrence with the next fragment id.
///
/// Returns the rewritten text and the number of ids assigned.
pub fn renumber_placeholders(input: &str) -> (String, usize) {
    let mut pieces = input.split(PLACEHOLDER_ID);
    let mut output = pieces.next().unwrap_or_default().to_string();
    let mut count = 0;
    for piece in pieces {
        output.push_str(&fragment_id(count));
        output.push_str(piece);
        count += 1;
    }
    (output, count)
}
