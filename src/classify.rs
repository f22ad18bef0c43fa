//! Pick the heading containers out of an ancestor chain.

use crate::document::{Document, NodeId, StableId};
use crate::position::Ancestor;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A heading enclosing some position, with the bounds of its whole subtree.
pub struct HeadingRef {
    /// Arena index of the heading.
    pub node: NodeId,
    /// Rank, 1..=6.
    pub level: u8,
    /// Title text.
    pub title: String,
    /// Identity for links and breadcrumbs.
    pub stable_id: StableId,
    /// Position directly before the heading.
    pub container_start: usize,
    /// Position directly after the heading's subtree.
    pub container_end: usize,
}

#[must_use]
/// Describe a single heading node, if it is one and is attached.
pub fn heading_ref(doc: &Document, node: NodeId) -> Option<HeadingRef> {
    let level = doc.level(node)?;
    let stable_id = doc.stable_id(node)?.clone();
    let container_start = doc.node_start(node)?;
    Some(HeadingRef {
        node,
        level,
        title: doc.title(node).unwrap_or_default().to_string(),
        stable_id,
        container_start,
        container_end: container_start + doc.node_size(node),
    })
}

#[must_use]
/// Keep only the headings of an ancestor chain, root first.
///
/// An empty result means the position sits at document root level.
pub fn classify(doc: &Document, chain: &[Ancestor]) -> Vec<HeadingRef> {
    chain
        .iter()
        .filter_map(|ancestor| {
            Some(HeadingRef {
                node: ancestor.node,
                level: doc.level(ancestor.node)?,
                title: doc.title(ancestor.node).unwrap_or_default().to_string(),
                stable_id: doc.stable_id(ancestor.node)?.clone(),
                container_start: ancestor.start - 1,
                container_end: ancestor.end + 1,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/classify.rs"]
mod tests;
