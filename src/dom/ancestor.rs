//! Common-ancestor search and wrapping of the sibling span it yields.

use crate::error::{Error, Result};

use super::arena::{Dom, NodeId};

/// Nearest shared parent of a node set and the contiguous children of that
/// parent which cover every node in the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonParent {
    pub parent: NodeId,
    pub children: Vec<NodeId>,
}

/// Find the nearest parent whose child span covers all `elements`.
///
/// Elements are first lifted to a common depth. The search then climbs one
/// level at a time, replacing the node set with its (de-duplicated) parents,
/// until the set has a single parent. The returned children run from the
/// leftmost to the rightmost node of the final set, text nodes included.
pub fn find_common_parent(dom: &Dom, elements: &[NodeId]) -> Result<CommonParent> {
    if elements.is_empty() {
        return Err(Error::NoMatchingChildren);
    }

    for &element in elements {
        parent_of(dom, element)?;
    }

    let max_levels = dom.len();
    let target_depth = elements
        .iter()
        .map(|&e| dom.depth(e))
        .min()
        .unwrap_or(0);

    let mut level: Vec<NodeId> = Vec::with_capacity(elements.len());
    for &element in elements {
        let mut current = element;
        for _ in target_depth..dom.depth(element) {
            current = parent_of(dom, current)?;
        }
        push_unique(&mut level, current);
    }

    for _ in 0..max_levels {
        let mut parents = Vec::new();
        for &node in &level {
            push_unique(&mut parents, parent_of(dom, node)?);
        }

        if let [parent] = parents[..] {
            let positions: Vec<usize> = level
                .iter()
                .filter_map(|&n| dom.index_in_parent(n))
                .collect();
            let (Some(&first), Some(&last)) = (positions.iter().min(), positions.iter().max())
            else {
                return Err(Error::NoMatchingChildren);
            };
            let siblings = dom.children(parent);
            let children = dom
                .sibling_range(parent, siblings[first], siblings[last])
                .filter(|c| !c.is_empty())
                .ok_or(Error::NoMatchingChildren)?;
            return Ok(CommonParent { parent, children });
        }

        level = parents;
    }

    Err(Error::AncestorSearchExhausted(max_levels))
}

/// Wrap the common-parent span of `elements` in a new `<span>`, inserted
/// where the first covered child was. Returns the wrapper.
pub fn wrap_common_parent(dom: &mut Dom, elements: &[NodeId]) -> Result<NodeId> {
    let CommonParent { children, .. } = find_common_parent(dom, elements)?;
    let wrapper = dom.create_html_element("span");
    dom.wrap_siblings(&children, wrapper)
        .ok_or(Error::NoMatchingChildren)?;
    Ok(wrapper)
}

fn parent_of(dom: &Dom, node: NodeId) -> Result<NodeId> {
    dom.parent(node).ok_or_else(|| {
        let name = dom
            .element_name(node)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "#node".to_string());
        Error::OrphanElement(name)
    })
}

fn push_unique(set: &mut Vec<NodeId>, id: NodeId) {
    if !set.contains(&id) {
        set.push(id);
    }
}
