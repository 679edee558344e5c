//! Arena-based DOM for HTML parsing and in-place rewriting.
//!
//! Nodes live in one vector and reference each other by [`NodeId`]. Every
//! node stores its parent handle and an ordered list of child handles, so
//! the pipeline can splice sibling ranges without shared mutable pointers.
//! Detached nodes stay in the arena; they are simply unreachable from the
//! document root.

use html5ever::{LocalName, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and ordered attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    /// Character data.
    Text(String),
    /// Comment (also where html5ever puts `<?xml ...?>` declarations).
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Attribute as written in markup (`prefix:local` or `local`).
    pub fn qualified_name(&self) -> String {
        match &self.name.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name.local),
            None => self.name.local.to_string(),
        }
    }
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena-based document tree.
#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Dom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId(0),
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create a detached element in the HTML namespace with no attributes.
    pub fn create_html_element(&mut self, local: &str) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(local));
        self.create_element(name, Vec::new())
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a detached doctype node.
    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of a node among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Number of edges between a node and the root it hangs from.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Remove a node from its parent, keeping its subtree intact.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
        }
    }

    /// Append a child to a parent node, detaching it from any previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Insert a child at `index` (clamped to the child count).
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Insert a node directly before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        self.detach(new_node);
        let Some(parent) = self.parent(sibling) else {
            return;
        };
        if let Some(index) = self.index_in_parent(sibling) {
            self.insert_child_at(parent, index, new_node);
        }
    }

    /// Append text to the last child if it is a text node, or create one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.children(parent).last().copied();
        if let Some(last) = last
            && let Some(NodeData::Text(existing)) = self.get_mut(last).map(|n| &mut n.data)
        {
            existing.push_str(text);
            return;
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Replace all children of a node with a single text node.
    pub fn set_text(&mut self, parent: NodeId, text: &str) {
        for child in self.children(parent).to_vec() {
            self.detach(child);
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// Contiguous run of children from `first` to `last` inclusive.
    ///
    /// Returns `None` when either node is not a child of `parent` or when
    /// `last` precedes `first`.
    pub fn sibling_range(&self, parent: NodeId, first: NodeId, last: NodeId) -> Option<Vec<NodeId>> {
        let children = self.children(parent);
        let start = children.iter().position(|&c| c == first)?;
        let end = children.iter().position(|&c| c == last)?;
        if end < start {
            return None;
        }
        Some(children[start..=end].to_vec())
    }

    /// Move `nodes` (contiguous siblings) under `wrapper` and put the wrapper
    /// where the first of them was.
    pub fn wrap_siblings(&mut self, nodes: &[NodeId], wrapper: NodeId) -> Option<()> {
        let first = *nodes.first()?;
        let parent = self.parent(first)?;
        let index = self.index_in_parent(first)?;
        for &node in nodes {
            self.detach(node);
        }
        for &node in nodes {
            self.append(wrapper, node);
        }
        self.insert_child_at(parent, index, wrapper);
        Some(())
    }

    /// Replace an element by its children, in place.
    pub fn unwrap(&mut self, id: NodeId) -> Option<()> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        let children = self.children(id).to_vec();
        self.detach(id);
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child_at(parent, index + offset, child);
        }
        Some(())
    }

    /// Get the number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Pre-order traversal of `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            stack: vec![root],
        }
    }

    /// Find the first element with the given tag (document order).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_by_tag_in(self.document, tag)
    }

    /// Find the first element with the given tag below `root`.
    pub fn find_by_tag_in(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(root)
            .find(|&id| self.element_name(id).is_some_and(|n| n.as_ref() == tag))
    }

    /// All elements whose tag is in `tags`, in document order.
    pub fn select(&self, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| {
                self.element_name(id)
                    .is_some_and(|n| tags.contains(&n.as_ref()))
            })
            .collect()
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack
            .extend(self.dom.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Convenience methods for element nodes.
impl Dom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Check whether a node is an element with the given tag.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.qualified_name() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: &str) {
        let Some(NodeData::Element { attrs, .. }) = self.get_mut(id).map(|n| &mut n.data) else {
            return;
        };
        if let Some(attr) = attrs.iter_mut().find(|a| a.qualified_name() == attr_name) {
            attr.value = value.to_string();
            return;
        }
        attrs.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(attr_name)),
            value: value.to_string(),
        });
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, id: NodeId, attr_name: &str) {
        if let Some(NodeData::Element { attrs, .. }) = self.get_mut(id).map(|n| &mut n.data) {
            attrs.retain(|a| a.qualified_name() != attr_name);
        }
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get_attr(id, "id")
    }

    /// Whitespace-separated entries of the class attribute.
    pub fn element_classes(&self, id: NodeId) -> Vec<&str> {
        self.get_attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn deep_text(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|d| self.text_content(d))
            .collect()
    }

    /// Concatenated text of the direct text children only.
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|&c| self.text_content(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(dom: &Dom, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| dom.deep_text(id)).collect()
    }

    fn paragraph(dom: &mut Dom, words: &[&str]) -> (NodeId, Vec<NodeId>) {
        let p = dom.create_html_element("p");
        dom.append(dom.document(), p);
        let spans = words
            .iter()
            .map(|w| {
                let span = dom.create_html_element("span");
                dom.append(p, span);
                dom.append_text(span, w);
                span
            })
            .collect();
        (p, spans)
    }

    #[test]
    fn test_create_elements() {
        let mut dom = Dom::new();
        let div = dom.create_html_element("div");
        dom.set_attr(div, "id", "main");
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.element_id(div), Some("main"));
        assert_eq!(dom.find_by_tag("div"), Some(div));
    }

    #[test]
    fn test_set_attr_keeps_order_and_uniqueness() {
        let mut dom = Dom::new();
        let span = dom.create_html_element("span");
        dom.set_attr(span, "class", "c1");
        dom.set_attr(span, "id", "a");
        dom.set_attr(span, "class", "c2");

        let NodeData::Element { attrs, .. } = &dom.get(span).unwrap().data else {
            panic!("expected element");
        };
        let names: Vec<_> = attrs.iter().map(|a| a.qualified_name()).collect();
        assert_eq!(names, vec!["class", "id"]);
        assert_eq!(dom.element_classes(span), vec!["c2"]);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = Dom::new();
        let p = dom.create_html_element("p");
        dom.append(dom.document(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        assert_eq!(dom.children(p).len(), 1);
        assert_eq!(dom.own_text(p), "Hello, World!");
    }

    #[test]
    fn test_sibling_range() {
        let mut dom = Dom::new();
        let (p, spans) = paragraph(&mut dom, &["a", "b", "c", "d"]);

        let range = dom.sibling_range(p, spans[1], spans[2]).unwrap();
        assert_eq!(text_of(&dom, &range), vec!["b", "c"]);
        assert!(dom.sibling_range(p, spans[2], spans[1]).is_none());
    }

    #[test]
    fn test_wrap_siblings_preserves_order() {
        let mut dom = Dom::new();
        let (p, spans) = paragraph(&mut dom, &["a", "b", "c", "d"]);
        let wrapper = dom.create_html_element("span");

        dom.wrap_siblings(&spans[1..3], wrapper).unwrap();

        let children = dom.children(p).to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(children[1], wrapper);
        assert_eq!(text_of(&dom, &children), vec!["a", "bc", "d"]);
        assert_eq!(dom.parent(spans[1]), Some(wrapper));
    }

    #[test]
    fn test_unwrap() {
        let mut dom = Dom::new();
        let (p, spans) = paragraph(&mut dom, &["a", "b", "c"]);
        let wrapper = dom.create_html_element("span");
        dom.wrap_siblings(&spans[0..2], wrapper).unwrap();

        dom.unwrap(wrapper).unwrap();

        assert_eq!(dom.children(p), spans.as_slice());
        assert_eq!(dom.parent(wrapper), None);
    }

    #[test]
    fn test_insert_child_at_clamps() {
        let mut dom = Dom::new();
        let (p, spans) = paragraph(&mut dom, &["a", "b"]);
        let extra = dom.create_html_element("span");

        dom.insert_child_at(p, 99, extra);
        assert_eq!(dom.children(p).last(), Some(&extra));

        dom.insert_before(spans[0], extra);
        assert_eq!(dom.children(p).first(), Some(&extra));
        assert_eq!(dom.children(p).len(), 3);
    }

    #[test]
    fn test_select_in_document_order() {
        let mut dom = Dom::new();
        let (p, _) = paragraph(&mut dom, &["a", "b"]);
        let sup = dom.create_html_element("sup");
        dom.insert_child_at(p, 1, sup);

        let found = dom.select(dom.document(), &["span", "sup"]);
        let tags: Vec<_> = found
            .iter()
            .map(|&id| dom.element_name(id).unwrap().to_string())
            .collect();
        assert_eq!(tags, vec!["span", "sup", "span"]);
        assert_eq!(dom.depth(sup), 2);
    }
}
