//! Highlight classification of text-bearing elements.

use crate::dom::{Dom, NodeId};
use crate::style::StyleRule;

/// Tags that can carry highlighted text.
pub const CUE_TAGS: &[&str] = &["span", "sup", "a"];

/// An element whose class maps to a highlighted rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredSpan {
    pub element: NodeId,
    /// Class that matched.
    pub class_name: String,
    /// Normalized (lowercase) background color of the matched rule.
    pub color: String,
}

/// Find highlighted elements in document order.
///
/// Rules are tried in stylesheet order and the first highlighted rule whose
/// class the element carries wins. Elements matching no highlighted rule do
/// not appear in the result at all.
pub fn classify(dom: &Dom, rules: &[StyleRule]) -> Vec<ColoredSpan> {
    let highlighted: Vec<&StyleRule> = rules.iter().filter(|r| r.is_highlighted()).collect();

    dom.select(dom.document(), CUE_TAGS)
        .into_iter()
        .filter_map(|element| {
            let classes = dom.element_classes(element);
            highlighted.iter().find_map(|rule| {
                if !classes.contains(&rule.class_name()) {
                    return None;
                }
                let color = rule.background_color()?.to_ascii_lowercase();
                Some(ColoredSpan {
                    element,
                    class_name: rule.class_name().to_string(),
                    color,
                })
            })
        })
        .collect()
}
