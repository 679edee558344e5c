//! Document-level structure: required landmarks, rejected markup, the
//! title, and the chapter section wrapping the body.

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const OPS_NAMESPACE: &str = "http://www.idpf.org/2007/ops";

/// Semantics given to the chapter section (and the overlay sequence).
pub const CHAPTER_TYPE: &str = "bodymatter chapter";

/// List markup is not modelled by run merging and is refused.
const REJECTED_TAGS: &[&str] = &["ul", "ol"];

/// Elements every input document must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmarks {
    pub head: NodeId,
    pub style: NodeId,
    pub body: NodeId,
}

/// Locate `<head>`, its `<style>` and `<body>`.
///
/// The style element must hold stylesheet text; an empty one counts as
/// missing.
pub fn locate(dom: &Dom) -> Result<Landmarks> {
    let head = dom.find_by_tag("head").ok_or(Error::MissingHead)?;
    let style = dom
        .find_by_tag_in(head, "style")
        .filter(|&s| dom.children(s).iter().any(|&c| dom.is_text(c)))
        .ok_or(Error::MissingStyle)?;
    let body = dom.find_by_tag("body").ok_or(Error::MissingBody)?;
    Ok(Landmarks { head, style, body })
}

/// Fail on the first list element under `root`.
pub fn reject_lists(dom: &Dom, root: NodeId) -> Result<()> {
    match dom.select(root, REJECTED_TAGS).first() {
        Some(&list) => {
            let tag = dom
                .element_name(list)
                .map(|n| n.to_string())
                .unwrap_or_default();
            Err(Error::UnsupportedInput(tag))
        }
        None => Ok(()),
    }
}

/// Set the document title, creating `<title>` in `<head>` when absent.
pub fn inject_title(dom: &mut Dom, head: NodeId, title: &str) {
    let existing = dom.find_by_tag_in(head, "title");
    let element = match existing {
        Some(element) => element,
        None => {
            let element = dom.create_html_element("title");
            dom.append(head, element);
            element
        }
    };
    dom.set_text(element, title);
}

/// Move every child of `<body>` into one chapter `<section>`.
///
/// The root element gets the XHTML and OPS namespace declarations plus the
/// document language. Returns the section.
pub fn wrap_in_section(dom: &mut Dom, body: NodeId, language: &str) -> NodeId {
    let section = dom.create_html_element("section");
    dom.set_attr(section, "epub:type", CHAPTER_TYPE);
    dom.set_attr(section, "role", "doc-chapter");

    let children = dom.children(body).to_vec();
    for child in children {
        dom.append(section, child);
    }
    dom.insert_child_at(body, 0, section);

    if let Some(html) = dom.find_by_tag("html") {
        if dom.get_attr(html, "xmlns").is_none() {
            dom.set_attr(html, "xmlns", XHTML_NAMESPACE);
        }
        if dom.get_attr(html, "xmlns:epub").is_none() {
            dom.set_attr(html, "xmlns:epub", OPS_NAMESPACE);
        }
        dom.set_attr(html, "lang", language);
        dom.set_attr(html, "xml:lang", language);
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{parse_html, serialize};
    use crate::error::ErrorKind;

    #[test]
    fn test_locate_requires_style_text() {
        let dom = parse_html("<html><head><style></style></head><body></body></html>");
        assert!(matches!(locate(&dom), Err(Error::MissingStyle)));

        let dom = parse_html("<html><head><style>.c1{}</style></head><body></body></html>");
        assert!(locate(&dom).is_ok());
    }

    #[test]
    fn test_locate_requires_head() {
        let mut dom = Dom::new();
        let html = dom.create_html_element("html");
        dom.append(dom.document(), html);
        let err = locate(&dom).unwrap_err();
        assert!(matches!(err, Error::MissingHead));
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_reject_nested_list() {
        let dom = parse_html("<body><div><ul><li>item</li></ul></div></body>");
        let body = dom.find_by_tag("body").unwrap();
        let err = reject_lists(&dom, body).unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(ref tag) if tag == "ul"));
        assert_eq!(err.kind(), ErrorKind::UnsupportedInput);
    }

    #[test]
    fn test_inject_title_replaces_text() {
        let mut dom = parse_html("<html><head><title>old</title></head><body></body></html>");
        let head = dom.find_by_tag("head").unwrap();
        inject_title(&mut dom, head, "Chapter 1");
        assert!(serialize(&dom).contains("<title>Chapter 1</title>"));

        let mut dom = parse_html("<html><head></head><body></body></html>");
        let head = dom.find_by_tag("head").unwrap();
        inject_title(&mut dom, head, "New");
        assert!(serialize(&dom).contains("<head><title>New</title></head>"));
    }

    #[test]
    fn test_wrap_in_section() {
        let mut dom = parse_html("<html><head></head><body><p>a</p><p>b</p></body></html>");
        let body = dom.find_by_tag("body").unwrap();
        wrap_in_section(&mut dom, body, "en-US");

        let output = serialize(&dom);
        assert!(output.contains(
            r#"<body><section epub:type="bodymatter chapter" role="doc-chapter"><p>a</p><p>b</p></section></body>"#
        ));
        assert!(output.contains(r#"xmlns="http://www.w3.org/1999/xhtml""#));
        assert!(output.contains(r#"lang="en-US" xml:lang="en-US""#));
    }
}
