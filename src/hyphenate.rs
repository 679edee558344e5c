//! Soft-hyphen insertion for cue text.
//!
//! Hyphenation works on the rendered markup rather than on the tree. The
//! markup's character data is walked in step with the tree's text nodes,
//! so each text node owns exactly one stretch of markup and text outside
//! cue elements (a title, an earlier paragraph) can never take a cue's
//! match. Edits are collected first and applied back to front so earlier
//! offsets stay valid.

use std::borrow::Cow;
use std::ops::Range;

use hyphenation::{Hyphenator as _, Language, Load, Standard};
use memchr::{memchr, memmem};
use tracing::{debug, warn};

use crate::cue::CUE_TAGS;
use crate::dom::{Dom, NodeData, RAW_TEXT_ELEMENTS, escape_text, is_raw_text_element};
use crate::error::{Error, Result};

/// Discretionary hyphen inserted at break opportunities.
pub const SOFT_HYPHEN: char = '\u{00AD}';

/// Words shorter than this (in chars) are never split.
const MIN_WORD_CHARS: usize = 5;

/// Locale hyphenation dictionary.
pub struct Hyphenator {
    dictionary: Standard,
}

impl Hyphenator {
    /// Load the dictionary for a language tag such as `en-US`.
    ///
    /// Returns `None` when no dictionary is available for the locale;
    /// hyphenation is then skipped rather than failing the pipeline.
    pub fn for_locale(tag: &str) -> Option<Self> {
        let Some(language) = language_for(tag) else {
            warn!(locale = tag, "no hyphenation patterns for locale");
            return None;
        };
        match Standard::from_embedded(language) {
            Ok(dictionary) => Some(Self { dictionary }),
            Err(e) => {
                warn!(locale = tag, error = %e, "hyphenation dictionary unavailable");
                None
            }
        }
    }

    /// Insert soft hyphens at every break opportunity of every word.
    pub fn hyphenate_text(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 4);
        let mut word_start = None;

        for (i, c) in text.char_indices() {
            if c.is_alphabetic() {
                word_start.get_or_insert(i);
                continue;
            }
            if let Some(start) = word_start.take() {
                self.push_word(&text[start..i], &mut out);
            }
            out.push(c);
        }
        if let Some(start) = word_start {
            self.push_word(&text[start..], &mut out);
        }
        out
    }

    fn push_word(&self, word: &str, out: &mut String) {
        let lowercase = word.to_lowercase();
        // Break offsets are byte offsets; they only carry over when case
        // folding keeps the byte layout.
        if word.chars().count() < MIN_WORD_CHARS || lowercase.len() != word.len() {
            out.push_str(word);
            return;
        }

        let breaks = self.dictionary.hyphenate(&lowercase).breaks;
        let mut last = 0;
        for brk in breaks {
            if brk <= last || brk >= word.len() || !word.is_char_boundary(brk) {
                continue;
            }
            out.push_str(&word[last..brk]);
            out.push(SOFT_HYPHEN);
            last = brk;
        }
        out.push_str(&word[last..]);
    }
}

/// Map a BCP 47-ish tag onto a pattern language.
fn language_for(tag: &str) -> Option<Language> {
    let code = tag.trim().replace('_', "-").to_ascii_lowercase();
    if let Some(language) = Language::try_from_code(&code) {
        return Some(language);
    }
    match code.split('-').next() {
        Some("en") => Some(Language::EnglishUS),
        Some(primary) => Language::try_from_code(primary),
        None => None,
    }
}

/// Hyphenate the text of cue-capable elements inside rendered `markup`.
///
/// `dom` must be the tree `markup` was rendered from. Every text node is
/// matched, in document order, against the next stretch of character data
/// in the markup; a node that does not match fails with
/// [`Error::TextNotFound`]. Only direct text children of `span`, `sup` and
/// `a` are rewritten.
pub fn hyphenate_markup(dom: &Dom, markup: &str, hyphenator: &Hyphenator) -> Result<String> {
    let mut runs = text_runs(markup).into_iter();
    let mut pending = 0..0;
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for id in dom.descendants(dom.document()) {
        let Some(NodeData::Text(text)) = dom.get(id).map(|n| &n.data) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }
        let parent = dom.parent(id);
        let rendered = match parent {
            Some(p) if is_raw_text_element(dom, p) => Cow::Borrowed(text.as_str()),
            _ => Cow::Owned(escape_text(text)),
        };

        if pending.is_empty() {
            pending = runs.next().unwrap_or(markup.len()..markup.len());
        }
        let segment = pending.start..pending.start + rendered.len();
        if segment.end > pending.end || markup.get(segment.clone()) != Some(rendered.as_ref()) {
            return Err(Error::TextNotFound {
                context: "hyphenation",
                text: text.clone(),
            });
        }
        pending.start = segment.end;

        let in_cue_tag = parent
            .and_then(|p| dom.element_name(p))
            .is_some_and(|n| CUE_TAGS.contains(&n.as_ref()));
        if !in_cue_tag || text.trim().is_empty() || text.contains(SOFT_HYPHEN) {
            continue;
        }
        let hyphenated = hyphenator.hyphenate_text(text);
        if hyphenated != *text {
            edits.push((segment, escape_text(&hyphenated)));
        }
    }

    debug!(segments = edits.len(), "hyphenated text segments");

    let mut out = markup.to_string();
    for (range, replacement) in edits.into_iter().rev() {
        out.replace_range(range, &replacement);
    }
    Ok(out)
}

/// Byte ranges of the character data in `markup`, in document order.
///
/// Tags, comments and doctypes are skipped. The content of a raw-text
/// element is one run.
fn text_runs(markup: &str) -> Vec<Range<usize>> {
    let bytes = markup.as_bytes();
    let mut runs = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while let Some(found) = memchr(b'<', &bytes[i..]) {
        let open = i + found;
        if open > text_start {
            runs.push(text_start..open);
        }

        if bytes[open..].starts_with(b"<!--") {
            i = memmem::find(&bytes[open + 4..], b"-->").map_or(bytes.len(), |end| open + end + 7);
        } else {
            let end = tag_end(bytes, open);
            i = end;
            if let Some(name) = start_tag_name(&markup[open..end])
                && RAW_TEXT_ELEMENTS.contains(&name)
            {
                let close = format!("</{name}");
                let content_end =
                    memmem::find(&bytes[end..], close.as_bytes()).map_or(bytes.len(), |c| end + c);
                if content_end > end {
                    runs.push(end..content_end);
                }
                i = content_end;
            }
        }
        text_start = i;
    }
    if text_start < bytes.len() {
        runs.push(text_start..bytes.len());
    }
    runs
}

/// Offset just past the `>` closing the tag that opens at `open`.
fn tag_end(bytes: &[u8], open: usize) -> usize {
    let mut quote = None;
    for (offset, &b) in bytes[open + 1..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return open + offset + 2,
            None => {}
        }
    }
    bytes.len()
}

fn start_tag_name(tag: &str) -> Option<&str> {
    let rest = tag.strip_prefix('<')?;
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let len = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, serialize};

    fn english() -> Hyphenator {
        Hyphenator::for_locale("en-US").expect("en-US patterns are embedded")
    }

    fn strip(s: &str) -> String {
        s.replace(SOFT_HYPHEN, "")
    }

    #[test]
    fn test_hyphenate_text_only_adds_soft_hyphens() {
        let h = english();
        let text = "Hyphenation of extraordinary words, not of short ones.";
        let out = h.hyphenate_text(text);
        assert!(out.contains(SOFT_HYPHEN));
        assert_eq!(strip(&out), text);
        assert!(out.contains(" of "));
    }

    #[test]
    fn test_locale_fallbacks() {
        assert!(language_for("en_GB").is_some());
        assert!(language_for("EN").is_some());
        assert!(language_for("xx-YY").is_none());
        assert!(Hyphenator::for_locale("xx").is_none());
    }

    #[test]
    fn test_markup_outside_text_is_untouched() {
        let dom = parse_html(
            r#"<p class="understanding"><span class="c1">understanding</span> <a href="understanding.html">understanding</a></p>"#,
        );
        let markup = serialize(&dom);
        let out = hyphenate_markup(&dom, &markup, &english()).unwrap();

        assert_ne!(out, markup);
        assert_eq!(strip(&out), markup);
        assert!(out.contains(r#"class="understanding""#));
        assert!(out.contains(r#"href="understanding.html""#));
        assert!(!out.contains("<p class=\"understanding\">understanding"));
    }

    #[test]
    fn test_repeated_text_is_matched_left_to_right() {
        let dom = parse_html(
            r#"<p><span>remarkable</span><span>remarkable</span><span>remarkable</span></p>"#,
        );
        let markup = serialize(&dom);
        let out = hyphenate_markup(&dom, &markup, &english()).unwrap();
        assert_eq!(out.matches(SOFT_HYPHEN).count() % 3, 0);
        assert!(!out.contains(">remarkable<"));
    }

    #[test]
    fn test_title_with_cue_text_is_not_hyphenated() {
        let dom = parse_html(
            "<html><head><title>Remarkable</title></head><body><p><span class=\"c1\">Remarkable</span></p></body></html>",
        );
        let markup = serialize(&dom);
        let out = hyphenate_markup(&dom, &markup, &english()).unwrap();

        assert!(out.contains("<title>Remarkable</title>"));
        let span = &out[out.find("<span").unwrap()..];
        assert!(span.contains(SOFT_HYPHEN));
        assert_eq!(strip(&out), markup);
    }

    #[test]
    fn test_earlier_paragraph_with_cue_text_is_not_hyphenated() {
        let dom = parse_html(
            "<p>extraordinary</p><p><span class=\"c1\">extraordinary</span></p>",
        );
        let markup = serialize(&dom);
        let out = hyphenate_markup(&dom, &markup, &english()).unwrap();

        assert!(out.contains("<p>extraordinary</p>"));
        assert!(!out.contains("<span class=\"c1\">extraordinary</span>"));
        assert_eq!(strip(&out), markup);
    }

    #[test]
    fn test_raw_text_and_comments_keep_alignment() {
        let dom = parse_html(
            "<html><head><style>.a>b{color:red}</style></head><body><!-- <span>x</span> --><p title=\"a>b\">Tom &amp; Jerry<span>consideration</span></p></body></html>",
        );
        let markup = serialize(&dom);
        let out = hyphenate_markup(&dom, &markup, &english()).unwrap();

        assert!(out.contains("<style>.a>b{color:red}</style>"));
        assert!(out.contains("<!-- <span>x</span> -->"));
        assert!(out.contains("Tom &amp; Jerry<span>con"));
        assert!(out.contains(SOFT_HYPHEN));
        assert_eq!(strip(&out), markup);
    }

    #[test]
    fn test_text_runs() {
        let markup = "<!DOCTYPE html><p a=\"<x>\">one<!--c-->two<br>three</p><style>a>b</style>";
        let runs: Vec<&str> = text_runs(markup).into_iter().map(|r| &markup[r]).collect();
        assert_eq!(runs, vec!["one", "two", "three", "a>b"]);
    }

    #[test]
    fn test_missing_text_is_fatal() {
        let dom = parse_html("<p><span>elsewhere</span></p>");
        let err = hyphenate_markup(&dom, "<p><span>other</span></p>", &english()).unwrap_err();
        assert!(matches!(err, Error::TextNotFound { .. }));
    }
}
