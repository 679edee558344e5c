//! Markup rendering for the arena DOM through html5ever's HTML serializer.
//!
//! XHTML fix-ups (self-closed void elements, entity expansion) happen later
//! as string rewrites in [`crate::xhtml`].

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope};

use super::arena::{Dom, NodeData, NodeId};

/// Elements whose text html5ever writes without escaping.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// A node of a [`Dom`] that html5ever can serialize.
pub struct SerializableNode<'a> {
    dom: &'a Dom,
    node: NodeId,
}

impl<'a> SerializableNode<'a> {
    pub fn new(dom: &'a Dom, node: NodeId) -> Self {
        Self { dom, node }
    }
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(self.dom, self.node, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for &child in self.dom.children(self.node) {
                    write_node(self.dom, child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

fn write_node<S: Serializer>(dom: &Dom, id: NodeId, serializer: &mut S) -> io::Result<()> {
    let Some(node) = dom.get(id) else {
        return Ok(());
    };

    match &node.data {
        NodeData::Document => {
            for &child in &node.children {
                write_node(dom, child, serializer)?;
            }
            Ok(())
        }
        NodeData::Element { name, attrs } => {
            serializer.start_elem(
                name.clone(),
                attrs.iter().map(|a| (&a.name, a.value.as_str())),
            )?;
            for &child in &node.children {
                write_node(dom, child, serializer)?;
            }
            serializer.end_elem(name.clone())
        }
        NodeData::Text(text) => serializer.write_text(text),
        NodeData::Comment(text) => serializer.write_comment(text),
        NodeData::Doctype { name, .. } => serializer.write_doctype(name),
    }
}

/// Render the whole document.
pub fn serialize(dom: &Dom) -> String {
    let mut bytes = Vec::new();
    let document = SerializableNode::new(dom, dom.document());

    html5ever::serialize::serialize(&mut bytes, &document, SerializeOpts::default())
        .expect("serialization failed");

    String::from_utf8(bytes).unwrap_or_default()
}

/// Whether html5ever writes the text children of `element` unescaped.
pub fn is_raw_text_element(dom: &Dom, element: NodeId) -> bool {
    dom.element_name(element)
        .is_some_and(|n| RAW_TEXT_ELEMENTS.contains(&n.as_ref()))
}

/// Escape character data the way [`serialize`] renders it.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}
