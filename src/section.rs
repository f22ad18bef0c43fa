//! Table-of-contents entries for every heading in a document.
//!
//! A section is the flattened view of one heading container: where it sits in the containment
//! tree (parent and children by index into the same list), its rank, and the positions bounding
//! its whole subtree. Depth and rank are reported separately since they need not agree.

use crate::breadcrumb::slugify;
use crate::document::{Document, NodeId, StableId};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One heading as seen by a table of contents.
pub struct Section {
    /// Heading title text.
    pub title: String,
    /// Normalised title.
    pub slug: String,
    /// Rank, 1..=6.
    pub level: u8,
    /// Number of headings structurally enclosing this one.
    pub depth: usize,
    /// Identity for deep links.
    pub stable_id: StableId,
    /// Arena index of the heading.
    pub node: NodeId,
    /// Position directly before the heading.
    pub start: usize,
    /// Position directly after the heading's subtree.
    pub end: usize,
    /// Index of the containing section in the table.
    pub parent_index: Option<usize>,
    /// Indices of directly nested sections.
    pub children_indices: Vec<usize>,
}

#[must_use]
/// List every attached heading in document order.
pub fn table_of_contents(doc: &Document) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut index_of: HashMap<NodeId, usize> = HashMap::new();

    for node in doc.headings() {
        let (Some(level), Some(stable_id), Some(start)) =
            (doc.level(node), doc.stable_id(node), doc.node_start(node))
        else {
            continue;
        };
        let parent_index = enclosing_heading(doc, node).and_then(|h| index_of.get(&h).copied());
        let depth = parent_index.map_or(0, |p| sections[p].depth + 1);
        let title = doc.title(node).unwrap_or_default().to_string();

        let index = sections.len();
        if let Some(p) = parent_index {
            sections[p].children_indices.push(index);
        }
        index_of.insert(node, index);
        sections.push(Section {
            slug: slugify(&title),
            title,
            level,
            depth,
            stable_id: stable_id.clone(),
            node,
            start,
            end: start + doc.node_size(node),
            parent_index,
            children_indices: Vec::new(),
        });
    }

    sections
}

fn enclosing_heading(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.parent(node)?;
    loop {
        if doc.is_heading(current) {
            return Some(current);
        }
        current = doc.parent(current)?;
    }
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
