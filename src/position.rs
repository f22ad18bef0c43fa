//! Resolve raw offsets and heading identities into depth-tagged ancestor chains.

use crate::document::{Document, NodeId, StableId};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One container on the path from the root down to a position.
pub struct Ancestor {
    /// The enclosing node.
    pub node: NodeId,
    /// Containment depth, 0 for the root.
    pub depth: usize,
    /// First position inside the node's boundaries.
    pub start: usize,
    /// Last position inside the node's boundaries.
    pub end: usize,
    /// Child index at the position, or the character offset within a text block.
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A position together with the chain of containers enclosing it, root first.
pub struct ResolvedPos {
    /// The resolved offset.
    pub pos: usize,
    /// Enclosing containers, root first.
    pub chain: Vec<Ancestor>,
}

impl ResolvedPos {
    #[must_use]
    /// The innermost enclosing container.
    pub fn parent(&self) -> &Ancestor {
        // The root is always present.
        &self.chain[self.chain.len() - 1]
    }

    #[must_use]
    /// Depth of the innermost container.
    pub fn depth(&self) -> usize {
        self.chain.len() - 1
    }

    #[must_use]
    /// Character offset when the position sits inside a text block.
    pub fn text_offset(&self, doc: &Document) -> Option<usize> {
        let parent = self.parent();
        doc.get(parent.node)
            .filter(|n| n.kind.is_textblock())
            .map(|_| parent.index)
    }
}

#[must_use]
/// Resolve an offset against a document. `None` when it lies beyond the end.
pub fn resolve(doc: &Document, pos: usize) -> Option<ResolvedPos> {
    let root = doc.root();
    if pos > doc.content_size(root) {
        return None;
    }

    let mut chain = Vec::new();
    let mut node = root;
    let mut start = 0;
    loop {
        let depth = chain.len();
        let end = start + doc.content_size(node);
        let current = doc.get(node)?;

        if current.kind.is_textblock() {
            chain.push(Ancestor {
                node,
                depth,
                start,
                end,
                index: pos - start,
            });
            break;
        }

        let mut offset = start;
        let mut index = current.children.len();
        let mut inner = None;
        for (i, &child) in current.children.iter().enumerate() {
            let size = doc.node_size(child);
            if pos == offset {
                index = i;
                break;
            }
            if pos < offset + size {
                index = i;
                inner = Some((child, offset + 1));
                break;
            }
            offset += size;
        }

        chain.push(Ancestor {
            node,
            depth,
            start,
            end,
            index,
        });
        match inner {
            Some((child, child_start)) => {
                node = child;
                start = child_start;
            }
            None => break,
        }
    }

    Some(ResolvedPos { pos, chain })
}

#[must_use]
/// Resolve the end of a heading's title text, located by identity alone.
pub fn resolve_heading(doc: &Document, id: &StableId) -> Option<ResolvedPos> {
    let heading = doc.find_by_stable_id(id)?;
    let title = doc.title_node(heading)?;
    let pos = doc.content_start(title)? + doc.content_size(title);
    resolve(doc, pos)
}

#[cfg(test)]
#[path = "tests/position.rs"]
mod tests;
