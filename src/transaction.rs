//! Atomic edits against a working copy of a document snapshot.
//!
//! A transaction clones its base snapshot and stages every primitive on the copy. Nothing is
//! observable until [`Transaction::commit`] hands back the new snapshot; dropping the
//! transaction instead discards all staged work, so a half-applied restructuring can never
//! leak out.

use crate::document::{validate_level, Document, NodeId, NodeKind, StableId};
use crate::error::OutlineError;
use std::ops::Range;

/// Staged edits over a private copy of a document.
pub struct Transaction {
    doc: Document,
    base_revision: u64,
    steps: usize,
}

impl Transaction {
    #[must_use]
    /// Start a transaction on top of `base`.
    pub fn new(base: &Document) -> Self {
        Self {
            doc: base.clone(),
            base_revision: base.revision(),
            steps: 0,
        }
    }

    #[must_use]
    /// The working copy as staged so far.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    /// Revision of the snapshot this transaction started from.
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    /// Create a detached heading with empty body.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::InvalidLevel`] for ranks outside H1..H6.
    pub fn create_heading(
        &mut self,
        level: u8,
        title: &str,
        id: Option<StableId>,
    ) -> Result<NodeId, OutlineError> {
        let level = validate_level(level)?;
        self.steps += 1;
        Ok(self.doc.alloc_heading(level, title, id))
    }

    /// Create a detached paragraph.
    pub fn create_paragraph(&mut self, text: &str) -> NodeId {
        self.steps += 1;
        self.doc.alloc_text(NodeKind::Paragraph, text)
    }

    /// Insert detached nodes into `parent` at child `index`.
    pub fn insert_into(&mut self, parent: NodeId, index: usize, nodes: Vec<NodeId>) {
        self.steps += 1;
        self.doc.attach(parent, index, nodes);
    }

    /// Insert detached nodes directly after `anchor`, in the same container.
    ///
    /// Returns `false` (and stages nothing) when the anchor is detached.
    pub fn insert_after(&mut self, anchor: NodeId, nodes: Vec<NodeId>) -> bool {
        let Some(parent) = self.doc.parent(anchor) else {
            return false;
        };
        let Some(index) = self.doc.children(parent).iter().position(|&c| c == anchor) else {
            return false;
        };
        self.insert_into(parent, index + 1, nodes);
        true
    }

    /// Detach a run of children from `parent`, returning them in order.
    pub fn remove_range(&mut self, parent: NodeId, range: Range<usize>) -> Vec<NodeId> {
        self.steps += 1;
        self.doc.detach(parent, range)
    }

    /// Swap a run of children of `parent` for `nodes`, returning the detached run.
    pub fn replace_range(
        &mut self,
        parent: NodeId,
        range: Range<usize>,
        nodes: Vec<NodeId>,
    ) -> Vec<NodeId> {
        let index = range.start;
        let removed = self.remove_range(parent, range);
        self.insert_into(parent, index, nodes);
        removed
    }

    #[must_use]
    /// Finish the transaction, producing the next snapshot.
    ///
    /// Identities of nodes left detached are retired and the revision advances exactly once.
    pub fn commit(mut self) -> Document {
        self.doc.prune_detached_ids();
        self.doc.bump_revision();
        tracing::debug!(
            base = self.base_revision,
            revision = self.doc.revision(),
            steps = self.steps,
            "committed transaction"
        );
        self.doc
    }
}

#[cfg(test)]
#[path = "tests/transaction.rs"]
mod tests;
