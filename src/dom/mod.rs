//! Document tree: parsing, tree surgery and markup rendering.
//!
//! Word-processor exports are parsed with html5ever into an arena [`Dom`].
//! Pipeline stages mutate that tree in place and render it back to markup
//! with [`serialize`].

mod ancestor;
mod arena;
mod serialize;
mod tree_sink;

pub use ancestor::{CommonParent, find_common_parent, wrap_common_parent};
pub use arena::{Attribute, Descendants, Dom, Node, NodeData, NodeId};
pub use serialize::{
    RAW_TEXT_ELEMENTS, SerializableNode, escape_text, is_raw_text_element, serialize,
};
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse an HTML document into an arena DOM.
pub fn parse_html(html: &str) -> Dom {
    let sink = DomSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    result.into_dom()
}
