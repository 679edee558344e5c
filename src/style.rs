//! Inline stylesheet handling.
//!
//! Word-processor exports carry one `<style>` block of class rules such as
//! `.c1{background-color:#ffff00;font-weight:700}`. Highlighted text is
//! marked only through those classes, so the rules are parsed to find which
//! classes carry a background color, and the colors are erased once the
//! highlighted runs have been turned into cue elements.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

/// Property that marks highlighted text.
pub const BACKGROUND_COLOR: &str = "background-color";

/// One parsed rule: a class name and its declarations in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    selector: String,
    class_name: String,
    properties: Vec<(String, String)>,
}

impl StyleRule {
    /// Build a rule from its raw selector text and declarations.
    ///
    /// The class name is whatever follows the last `);` in the selector
    /// (exports prepend `@import url(...);` to the first rule), without one
    /// leading `.`.
    pub fn new(selector: &str, properties: Vec<(String, String)>) -> Self {
        let tail = selector.rsplit(");").next().unwrap_or(selector);
        let class_name = tail.strip_prefix('.').unwrap_or(tail).to_string();
        Self {
            selector: selector.to_string(),
            class_name,
            properties,
        }
    }

    /// Parse a rule from raw selector text and a declaration block body.
    fn from_parts(selector: &str, body: &str) -> Self {
        let mut properties: Vec<(String, String)> = Vec::new();
        for declaration in body.split(';') {
            let Some((key, value)) = declaration.split_once(':') else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            match properties.iter_mut().find(|(k, _)| k == key) {
                Some(existing) => existing.1 = value.to_string(),
                None => properties.push((key.to_string(), value.to_string())),
            }
        }
        Self::new(selector, properties)
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Value of a declared property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn background_color(&self) -> Option<&str> {
        self.property(BACKGROUND_COLOR)
    }

    /// A rule highlights text when it sets a background color other than white.
    pub fn is_highlighted(&self) -> bool {
        self.background_color().is_some_and(|c| !is_white(c))
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}{{", self.class_name)?;
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{key}:{value}")?;
        }
        f.write_str("}")
    }
}

/// Check whether a CSS color value is pure white.
pub fn is_white(color: &str) -> bool {
    let color = color.trim().to_ascii_lowercase();
    matches!(
        color.as_str(),
        "#ffffff" | "#fff" | "white" | "rgb(255,255,255)"
    )
}

/// Parse every rule of a stylesheet, in source order.
///
/// Comments are dropped and all whitespace is removed before scanning, so
/// the result is insensitive to formatting. Rules nested in a group block
/// (`@media ... { ... }`) are parsed as if they were top-level.
pub fn parse_stylesheet(css: &str) -> Vec<StyleRule> {
    let without_comments = strip_between(&strip_between(css, "<!--", "-->"), "/*", "*/");
    let compact: String = without_comments
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut rules = Vec::new();
    parse_blocks(&compact, &mut rules);
    rules
}

/// Only the rules that mark highlighted text.
pub fn highlighted_rules(css: &str) -> Vec<StyleRule> {
    parse_stylesheet(css)
        .into_iter()
        .filter(StyleRule::is_highlighted)
        .collect()
}

fn parse_blocks(mut rest: &str, rules: &mut Vec<StyleRule>) {
    while let Some(open) = rest.find('{') {
        let selector = &rest[..open];
        let body_start = open + 1;

        let mut depth = 1usize;
        let mut close = None;
        for (i, c) in rest[body_start..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(body_start + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        // Unterminated block: nothing more can be parsed reliably
        let Some(close) = close else {
            break;
        };

        let body = &rest[body_start..close];
        if body.contains('{') {
            parse_blocks(body, rules);
        } else {
            rules.push(StyleRule::from_parts(selector, body));
        }
        rest = &rest[close + 1..];
    }
}

/// Remove every `open ... close` section (non-greedy).
fn strip_between(input: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        match rest[start + open.len()..].find(close) {
            Some(end) => rest = &rest[start + open.len() + end + close.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

static BACKGROUND_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{;])\s*background-color\s*:\s*#[0-9a-fA-F]{6}\s*(;?)(\s*\})?")
        .expect("background-color pattern is valid")
});

/// Remove all `background-color: #rrggbb` declarations from stylesheet text.
///
/// The declaration may be first, last, in the middle or alone in its block;
/// separators are adjusted so no `{;` or `;}` is left behind.
pub fn erase_background_colors(css: &str) -> String {
    let mut out = css.to_string();
    while BACKGROUND_DECLARATION.is_match(&out) {
        out = BACKGROUND_DECLARATION
            .replace_all(&out, |caps: &Captures| {
                let lead = &caps[1];
                match (lead, caps.get(3)) {
                    ("{", Some(close)) => format!("{{{}", close.as_str()),
                    ("{", None) => "{".to_string(),
                    (_, Some(close)) => close.as_str().to_string(),
                    (_, None) => ";".to_string(),
                }
            })
            .into_owned();
    }
    out
}
