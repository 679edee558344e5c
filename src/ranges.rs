//! Character ranges of cues, links and images in the rendered plain text.
//!
//! The plain text is what a reading system's search and speech layers see:
//! markup stripped, whitespace collapsed, a line break after each block,
//! and one object replacement character per image. Offsets and lengths are
//! counted in Unicode scalar values.

use std::collections::HashMap;
use std::ops::Range;

use memchr::memmem;
use tracing::debug;

use crate::cue::cue_elements;
use crate::dom::{Dom, NodeData, NodeId};
use crate::error::{Error, Result};

/// Stand-in for an image in the plain text.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

const SKIPPED: &[&str] = &["head", "style", "script", "title", "template"];

const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "dt", "dd", "figure",
    "figcaption", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "nav",
    "p", "pre", "section", "table", "tr",
];

/// A `(location, length)` pair in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub location: usize,
    pub length: usize,
}

/// Plain-text rendering of a document, with the offset at which each node
/// starts and the stretch of text it rendered.
#[derive(Debug, Default)]
pub struct PlainText {
    text: String,
    chars: usize,
    starts: HashMap<NodeId, usize>,
    extents: HashMap<NodeId, Range<usize>>,
}

impl PlainText {
    pub fn render(dom: &Dom) -> Self {
        let mut plain = Self::default();
        plain.walk(dom, dom.document());
        plain
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.chars
    }

    /// Characters rendered before `id`, if it was rendered at all.
    pub fn offset_of(&self, id: NodeId) -> Option<usize> {
        self.starts.get(&id).copied()
    }

    /// Text rendered for `id` and its descendants, if it was rendered.
    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        self.extents.get(&id).map(|range| &self.text[range.clone()])
    }

    fn push(&mut self, c: char) {
        self.text.push(c);
        self.chars += 1;
    }

    fn ends_with_space(&self) -> bool {
        self.text.is_empty() || self.text.ends_with([' ', '\n'])
    }

    fn break_line(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.push('\n');
        }
    }

    fn walk(&mut self, dom: &Dom, id: NodeId) {
        let Some(node) = dom.get(id) else {
            return;
        };
        self.starts.insert(id, self.chars);
        let mut start = self.text.len();

        match &node.data {
            NodeData::Text(text) => {
                for c in collapse_whitespace(text).chars() {
                    if c == ' ' && self.ends_with_space() {
                        continue;
                    }
                    self.push(c);
                }
            }
            NodeData::Element { name, .. } => {
                let tag = name.local.as_ref();
                if SKIPPED.contains(&tag) {
                    return;
                }
                match tag {
                    "br" => self.push('\n'),
                    "img" => self.push(OBJECT_REPLACEMENT),
                    _ => {
                        let block = BLOCKS.contains(&tag);
                        if block {
                            self.break_line();
                            // Blocks start at the line they open.
                            self.starts.insert(id, self.chars);
                            start = self.text.len();
                        }
                        for &child in &node.children {
                            self.walk(dom, child);
                        }
                        if block {
                            self.push('\n');
                        }
                    }
                }
            }
            NodeData::Document => {
                for &child in &node.children {
                    self.walk(dom, child);
                }
            }
            NodeData::Comment(_) | NodeData::Doctype { .. } => {}
        }
        self.extents.insert(id, start..self.text.len());
    }
}

/// Replace every run of ASCII whitespace with one space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Locate the text of each element, in order, scanning forward only.
///
/// The needle is the element's own rendering, so text spanning blocks keeps
/// its line breaks. Each search starts where the previous match ended. An
/// element that was not rendered, or whose text cannot be found, fails with
/// [`Error::TextNotFound`].
pub fn locate_texts(
    dom: &Dom,
    plain: &PlainText,
    elements: &[NodeId],
    context: &'static str,
) -> Result<Vec<TextRange>> {
    let haystack = plain.as_str();
    let mut byte_cursor = 0;
    let mut char_cursor = 0;
    let mut ranges = Vec::with_capacity(elements.len());

    for &element in elements {
        let not_found = || Error::TextNotFound {
            context,
            text: collapse_whitespace(&dom.deep_text(element)).trim().to_string(),
        };
        let needle = plain
            .text_of(element)
            .ok_or_else(not_found)?
            .trim_matches([' ', '\n']);
        let found = memmem::find(&haystack.as_bytes()[byte_cursor..], needle.as_bytes())
            .ok_or_else(not_found)?;

        let start = byte_cursor + found;
        let end = start + needle.len();
        let location = char_cursor + haystack[byte_cursor..start].chars().count();
        let length = needle.chars().count();

        ranges.push(TextRange { location, length });
        byte_cursor = end;
        char_cursor = location + length;
    }
    Ok(ranges)
}

/// Ranges of images: everything rendered before the image, plus the single
/// replacement character.
pub fn image_ranges(plain: &PlainText, images: &[NodeId]) -> Vec<TextRange> {
    images
        .iter()
        .map(|&image| TextRange {
            location: plain.offset_of(image).unwrap_or(plain.char_len()),
            length: 1,
        })
        .collect()
}

/// Counts of annotated elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSummary {
    pub cues: usize,
    pub links: usize,
    pub images: usize,
}

fn set_range(dom: &mut Dom, element: NodeId, range: TextRange) {
    dom.set_attr(element, "textLocation", &range.location.to_string());
    dom.set_attr(element, "textLength", &range.length.to_string());
}

/// Add `textLocation`/`textLength` to every cue, anchor and image.
///
/// Cues and anchors are located by two independent forward scans; images
/// take the length of the text rendered before them.
pub fn annotate_ranges(dom: &mut Dom) -> Result<RangeSummary> {
    let plain = PlainText::render(dom);
    let root = dom.document();

    let cues = cue_elements(dom);
    let cue_ranges = locate_texts(dom, &plain, &cues, "cue")?;
    let links = dom.select(root, &["a"]);
    let link_ranges = locate_texts(dom, &plain, &links, "link")?;
    let images = dom.select(root, &["img"]);
    let img_ranges = image_ranges(&plain, &images);

    for (&element, &range) in cues.iter().zip(&cue_ranges) {
        set_range(dom, element, range);
    }
    for (&element, &range) in links.iter().zip(&link_ranges) {
        set_range(dom, element, range);
    }
    for (&element, &range) in images.iter().zip(&img_ranges) {
        set_range(dom, element, range);
    }

    let summary = RangeSummary {
        cues: cues.len(),
        links: links.len(),
        images: images.len(),
    };
    debug!(?summary, chars = plain.char_len(), "annotated text ranges");
    Ok(summary)
}
