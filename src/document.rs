//! Arena-backed outline document used as the host for heading restructuring.
//!
//! The document stores nodes in a flat arena addressed by [`NodeId`]. Containment is expressed
//! through parent/child indices, so moving a contiguous run of siblings to a new parent is a
//! slice re-index rather than a pointer rewrite. Heading rank lives in an attribute and is
//! never inferred from nesting depth.
//!
//! Positions follow a token model: a text block of `n` characters occupies `n + 2` positions,
//! a container occupies its content plus two boundary tokens, and the root has no boundaries.

use crate::error::OutlineError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Lowest heading rank (H1).
pub const MIN_LEVEL: u8 = 1;
/// Highest heading rank (H6).
pub const MAX_LEVEL: u8 = 6;

/// Reject ranks outside H1..H6.
///
/// # Errors
///
/// Returns [`OutlineError::InvalidLevel`] when `level` is not in `1..=6`.
pub fn validate_level(level: u8) -> Result<u8, OutlineError> {
    if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        Ok(level)
    } else {
        Err(OutlineError::InvalidLevel(level))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
/// Index of a node within its document's arena.
pub struct NodeId(pub usize);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Opaque heading identity, assigned once and never reused by the same document.
pub struct StableId(String);

impl StableId {
    #[must_use]
    /// Mint a fresh random identity.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    /// Borrow the identity as text, e.g. for a URL query parameter.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StableId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StableId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// What a node is, and the attributes that come with it.
pub enum NodeKind {
    /// The document itself. Has no boundary tokens.
    Root,
    /// A heading container with exactly `[Title, Body]` children.
    Heading {
        /// Presentational rank, independent of nesting depth.
        level: u8,
        /// Identity used for deep links and breadcrumb identity.
        id: StableId,
    },
    /// Inline title slot of a heading.
    Title,
    /// Block slot of a heading; may hold paragraphs and nested headings.
    Body,
    /// Plain block of inline text.
    Paragraph,
}

impl NodeKind {
    #[must_use]
    /// Whether positions inside this node address characters rather than children.
    pub fn is_textblock(&self) -> bool {
        matches!(self, Self::Title | Self::Paragraph)
    }
}

#[derive(Clone, Debug)]
/// A single arena slot.
pub struct Node {
    /// Node type and attributes.
    pub kind: NodeKind,
    /// Inline content for text blocks; empty for containers.
    pub text: String,
    /// Ordered child indices.
    pub children: Vec<NodeId>,
    /// Containing node, `None` for the root and for detached nodes.
    pub parent: Option<NodeId>,
    /// Source line this node was read from, when it came from a file.
    pub line: Option<usize>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: String::new(),
            children: Vec::new(),
            parent: None,
            line: None,
        }
    }
}

#[derive(Clone, Debug)]
/// Immutable-by-convention snapshot of an outline document.
///
/// Direct edits advance the revision once each; a committed
/// [`Transaction`](crate::transaction::Transaction) advances it once in total.
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    revision: u64,
    ids: HashMap<StableId, NodeId>,
    retired: HashSet<StableId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    /// Create an empty document holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root)],
            root: NodeId(0),
            revision: 0,
            ids: HashMap::new(),
            retired: HashSet::new(),
        }
    }

    #[must_use]
    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    /// Counter advanced by every committed change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    /// Look up a node in the arena.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    /// Ordered children of a node; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    /// Containing node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    #[must_use]
    /// Whether the node is a heading container.
    pub fn is_heading(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.kind), Some(NodeKind::Heading { .. }))
    }

    #[must_use]
    /// Rank of a heading.
    pub fn level(&self, id: NodeId) -> Option<u8> {
        match self.get(id)?.kind {
            NodeKind::Heading { level, .. } => Some(level),
            _ => None,
        }
    }

    #[must_use]
    /// Identity of a heading.
    pub fn stable_id(&self, id: NodeId) -> Option<&StableId> {
        match &self.get(id)?.kind {
            NodeKind::Heading { id, .. } => Some(id),
            _ => None,
        }
    }

    #[must_use]
    /// Title slot of a heading.
    pub fn title_node(&self, heading: NodeId) -> Option<NodeId> {
        if self.is_heading(heading) {
            self.children(heading).first().copied()
        } else {
            None
        }
    }

    #[must_use]
    /// Body slot of a heading.
    pub fn body_node(&self, heading: NodeId) -> Option<NodeId> {
        if self.is_heading(heading) {
            self.children(heading).get(1).copied()
        } else {
            None
        }
    }

    #[must_use]
    /// Title text of a heading.
    pub fn title(&self, heading: NodeId) -> Option<&str> {
        let title = self.title_node(heading)?;
        self.get(title).map(|n| n.text.as_str())
    }

    #[must_use]
    /// The block container that new children of `id` should go into.
    ///
    /// Headings and their titles map to the heading's body, paragraphs to the container that
    /// holds them.
    pub fn container_of(&self, id: NodeId) -> NodeId {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Root | NodeKind::Body) => id,
            Some(NodeKind::Heading { .. }) => self.body_node(id).unwrap_or(self.root),
            Some(NodeKind::Title) => self
                .parent(id)
                .and_then(|h| self.body_node(h))
                .unwrap_or(self.root),
            Some(NodeKind::Paragraph) | None => self.parent(id).unwrap_or(self.root),
        }
    }

    #[must_use]
    /// Whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    #[must_use]
    /// Direct lookup of a live heading by identity.
    pub fn find_by_stable_id(&self, id: &StableId) -> Option<NodeId> {
        self.ids
            .get(id)
            .copied()
            .filter(|&node| self.is_attached(node))
    }

    #[must_use]
    /// Whether the identity was ever handed out by this document, live or deleted.
    pub fn knows_stable_id(&self, id: &StableId) -> bool {
        self.ids.contains_key(id) || self.retired.contains(id)
    }

    #[must_use]
    /// Pre-order walk of `id` and everything beneath it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    #[must_use]
    /// Every attached heading in document order.
    pub fn headings(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.is_heading(id))
            .collect()
    }

    #[must_use]
    /// Number of positions occupied by a node, boundaries included.
    pub fn node_size(&self, id: NodeId) -> usize {
        match self.get(id).map(|n| &n.kind) {
            None => 0,
            Some(NodeKind::Root) => self.content_size(id),
            Some(_) => self.content_size(id) + 2,
        }
    }

    #[must_use]
    /// Number of positions between a node's boundaries.
    pub fn content_size(&self, id: NodeId) -> usize {
        let Some(node) = self.get(id) else {
            return 0;
        };
        if node.kind.is_textblock() {
            node.text.chars().count()
        } else {
            node.children.iter().map(|&c| self.node_size(c)).sum()
        }
    }

    #[must_use]
    /// Position directly before the node. `None` when detached.
    pub fn node_start(&self, id: NodeId) -> Option<usize> {
        if id == self.root {
            return Some(0);
        }
        let parent = self.parent(id)?;
        let mut offset = self.content_start(parent)?;
        for &sibling in self.children(parent) {
            if sibling == id {
                return Some(offset);
            }
            offset += self.node_size(sibling);
        }
        None
    }

    #[must_use]
    /// Position directly after the node. `None` when detached.
    pub fn node_end(&self, id: NodeId) -> Option<usize> {
        Some(self.node_start(id)? + self.node_size(id))
    }

    #[must_use]
    /// First position inside the node's boundaries.
    pub fn content_start(&self, id: NodeId) -> Option<usize> {
        if id == self.root {
            Some(0)
        } else {
            Some(self.node_start(id)? + 1)
        }
    }

    #[must_use]
    /// Position at the end of the last text block that starts on or before `line`.
    pub fn position_at_line(&self, line: usize) -> Option<usize> {
        let block = self
            .descendants(self.root)
            .into_iter()
            .rev()
            .find(|&id| {
                self.get(id)
                    .is_some_and(|n| n.kind.is_textblock() && n.line.is_some_and(|l| l <= line))
            })?;
        Some(self.content_start(block)? + self.content_size(block))
    }

    /// Append a heading to the container of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::InvalidLevel`] for ranks outside H1..H6.
    pub fn add_heading(
        &mut self,
        parent: NodeId,
        level: u8,
        title: &str,
    ) -> Result<NodeId, OutlineError> {
        self.add_heading_with_id(parent, level, title, None)
    }

    /// Append a heading, keeping `id` unless this document has already used it.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::InvalidLevel`] for ranks outside H1..H6.
    pub fn add_heading_with_id(
        &mut self,
        parent: NodeId,
        level: u8,
        title: &str,
        id: Option<StableId>,
    ) -> Result<NodeId, OutlineError> {
        let level = validate_level(level)?;
        let container = self.container_of(parent);
        let heading = self.alloc_heading(level, title, id);
        let index = self.children(container).len();
        self.attach(container, index, vec![heading]);
        self.revision += 1;
        Ok(heading)
    }

    /// Append a paragraph to the container of `parent`.
    pub fn add_paragraph(&mut self, parent: NodeId, text: &str) -> NodeId {
        let container = self.container_of(parent);
        let paragraph = self.alloc_text(NodeKind::Paragraph, text);
        let index = self.children(container).len();
        self.attach(container, index, vec![paragraph]);
        self.revision += 1;
        paragraph
    }

    /// Change a heading's rank. Containment is left exactly as it is.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::InvalidLevel`] for ranks outside H1..H6. Non-heading nodes are
    /// ignored.
    pub fn set_level(&mut self, heading: NodeId, level: u8) -> Result<(), OutlineError> {
        let level = validate_level(level)?;
        if let Some(NodeKind::Heading { level: current, .. }) =
            self.nodes.get_mut(heading.0).map(|n| &mut n.kind)
        {
            *current = level;
            self.revision += 1;
        }
        Ok(())
    }

    /// Replace a heading's title text.
    pub fn set_title(&mut self, heading: NodeId, title: &str) {
        if let Some(slot) = self.title_node(heading) {
            self.nodes[slot.0].text = title.to_string();
            self.revision += 1;
        }
    }

    /// Record the source line of a node.
    pub fn set_line(&mut self, id: NodeId, line: usize) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.line = Some(line);
        }
    }

    /// Delete a node and its subtree. Identities inside it are retired for good.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(index) = self.children(parent).iter().position(|&c| c == id) {
            self.detach(parent, index..index + 1);
            self.prune_detached_ids();
            self.revision += 1;
        }
    }

    pub(crate) fn alloc_text(&mut self, kind: NodeKind, text: &str) -> NodeId {
        let mut node = Node::new(kind);
        node.text = text.to_string();
        self.alloc(node)
    }

    pub(crate) fn alloc_heading(&mut self, level: u8, title: &str, id: Option<StableId>) -> NodeId {
        let id = match id {
            Some(id) if !self.knows_stable_id(&id) => id,
            Some(id) => {
                tracing::warn!("stable id {id} already used in this document, minting a new one");
                StableId::mint()
            }
            None => StableId::mint(),
        };
        let heading = self.alloc(Node::new(NodeKind::Heading {
            level,
            id: id.clone(),
        }));
        let title = self.alloc_text(NodeKind::Title, title);
        let body = self.alloc(Node::new(NodeKind::Body));
        self.attach(heading, 0, vec![title, body]);
        self.ids.insert(id, heading);
        heading
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn attach(&mut self, parent: NodeId, index: usize, children: Vec<NodeId>) {
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        let slot = &mut self.nodes[parent.0].children;
        let index = index.min(slot.len());
        slot.splice(index..index, children);
    }

    pub(crate) fn detach(&mut self, parent: NodeId, range: std::ops::Range<usize>) -> Vec<NodeId> {
        let slot = &mut self.nodes[parent.0].children;
        let end = range.end.min(slot.len());
        let start = range.start.min(end);
        let removed: Vec<NodeId> = slot.drain(start..end).collect();
        for &child in &removed {
            self.nodes[child.0].parent = None;
        }
        removed
    }

    pub(crate) fn prune_detached_ids(&mut self) {
        let dead: Vec<StableId> = self
            .ids
            .iter()
            .filter(|&(_, &node)| !self.is_attached(node))
            .map(|(id, _)| id.clone())
            .collect();
        for id in dead {
            self.ids.remove(&id);
            self.retired.insert(id);
        }
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
