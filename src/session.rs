//! The local editing session bridging the outline engine and an external document engine.
//!
//! The session keeps the latest local document (which already reflects inserts the external
//! engine has not confirmed yet), the cursor, and the collapsed headings of the current view.
//! Every insert resolves against that latest local state, never against a queued snapshot.
//!
//! Inserts are remembered as intents anchored to the surrounding structure: the block holding
//! the cursor, or the child just before it, named by heading identity where there is one. If
//! the external engine rejects or rebases the commit, [`Session::rebase`] re-derives each
//! insertion point from its anchor in the new base and runs decide + apply again, rather than replaying
//! a mutation computed against a document that no longer exists.

use crate::breadcrumb::{BreadcrumbPath, PathComposer};
use crate::classify::{classify, HeadingRef};
use crate::document::{Document, NodeId, NodeKind, StableId};
use crate::edit_plan::{insert_heading_with, HeadingSpec, InsertionPoint};
use crate::error::OutlineError;
use crate::navigator::{next_cursor_position, CollapsedSet, Direction, Navigation, Selection};
use crate::position::resolve;
use crate::strategy::Strategy;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A node named in a way that survives remote edits.
pub enum NodeRef {
    /// The document root.
    Root,
    /// A heading, by identity.
    Heading(StableId),
    /// The title slot of a heading.
    Title(StableId),
    /// The body slot of a heading.
    Body(StableId),
    /// A paragraph, by arena id. Snapshots forked from the same document share arena ids.
    Paragraph(NodeId),
}

impl NodeRef {
    #[must_use]
    /// Name `node` by its heading identity where it has one.
    pub fn of(doc: &Document, node: NodeId) -> Option<Self> {
        let owner = |slot| doc.parent(slot).and_then(|h| doc.stable_id(h)).cloned();
        Some(match &doc.get(node)?.kind {
            NodeKind::Root => Self::Root,
            NodeKind::Heading { id, .. } => Self::Heading(id.clone()),
            NodeKind::Title => Self::Title(owner(node)?),
            NodeKind::Body => Self::Body(owner(node)?),
            NodeKind::Paragraph => Self::Paragraph(node),
        })
    }

    #[must_use]
    /// The attached node this names in `doc`.
    pub fn find(&self, doc: &Document) -> Option<NodeId> {
        match self {
            Self::Root => Some(doc.root()),
            Self::Heading(id) => doc.find_by_stable_id(id),
            Self::Title(id) => doc.title_node(doc.find_by_stable_id(id)?),
            Self::Body(id) => doc.body_node(doc.find_by_stable_id(id)?),
            Self::Paragraph(node) => doc
                .get(*node)
                .is_some_and(|n| n.kind == NodeKind::Paragraph && doc.is_attached(*node))
                .then_some(*node),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A position expressed relative to the structure around it rather than as a raw offset.
///
/// Remote edits elsewhere in the document, including in the enclosing heading's title or
/// earlier in the same body, leave an anchor pointing at the same gap or character.
pub enum Anchor {
    /// Inside a text block.
    Text {
        /// The title or paragraph holding the position.
        block: NodeRef,
        /// Characters from the start of the block, clamped to its length when located.
        offset: usize,
    },
    /// Between two children of a container.
    Gap {
        /// Container holding the gap.
        container: NodeRef,
        /// Child directly before the gap, `None` at the start of the container.
        after: Option<NodeRef>,
    },
}

impl Anchor {
    #[must_use]
    /// Anchor `pos` to the innermost node enclosing it.
    pub fn at(doc: &Document, pos: usize) -> Option<Self> {
        let resolved = resolve(doc, pos)?;
        let parent = resolved.parent();
        let container = NodeRef::of(doc, parent.node)?;
        if doc.get(parent.node)?.kind.is_textblock() {
            return Some(Self::Text {
                block: container,
                offset: parent.index,
            });
        }
        let after = match parent.index.checked_sub(1) {
            Some(previous) => Some(NodeRef::of(doc, *doc.children(parent.node).get(previous)?)?),
            None => None,
        };
        Some(Self::Gap { container, after })
    }

    #[must_use]
    /// Find the anchored position in `doc`, if its nodes still exist in the same arrangement.
    pub fn locate(&self, doc: &Document) -> Option<usize> {
        match self {
            Self::Text { block, offset } => {
                let block = block.find(doc)?;
                Some(doc.content_start(block)? + (*offset).min(doc.content_size(block)))
            }
            Self::Gap {
                container,
                after: None,
            } => doc.content_start(container.find(doc)?),
            Self::Gap {
                container,
                after: Some(after),
            } => {
                let container = container.find(doc)?;
                let after = after.find(doc)?;
                if doc.parent(after) != Some(container) {
                    return None;
                }
                doc.node_end(after)
            }
        }
    }
}

#[derive(Clone, Debug)]
/// A locally applied insert awaiting confirmation.
pub struct Intent {
    /// Heading to create, carrying the identity it was given locally.
    pub spec: HeadingSpec,
    /// Where the cursor was when the insert was issued.
    pub anchor: Anchor,
    /// Raw cursor offset in the revision the insert was first resolved against.
    pub pos: usize,
    /// Revision the insert was first resolved against.
    pub revision: u64,
}

/// Latest local document, cursor and view state for one editor.
pub struct Session {
    document: Document,
    cursor: usize,
    collapsed: CollapsedSet,
    pending: Vec<Intent>,
}

impl Session {
    #[must_use]
    /// Start a session with the cursor at the beginning of `document`.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            cursor: 0,
            collapsed: CollapsedSet::new(),
            pending: Vec::new(),
        }
    }

    #[must_use]
    /// Latest local document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, returning `false` if `pos` is outside the document.
    pub fn set_cursor(&mut self, pos: usize) -> bool {
        if resolve(&self.document, pos).is_some() {
            self.cursor = pos;
            true
        } else {
            false
        }
    }

    #[must_use]
    /// Inserts applied locally but not yet confirmed.
    pub fn pending(&self) -> &[Intent] {
        &self.pending
    }

    #[must_use]
    /// Collapsed headings of the current view.
    pub fn collapsed(&self) -> &CollapsedSet {
        &self.collapsed
    }

    /// Mutable access to the collapsed headings of the current view.
    pub fn collapsed_mut(&mut self) -> &mut CollapsedSet {
        &mut self.collapsed
    }

    #[must_use]
    /// Headings enclosing the cursor, root first.
    pub fn headings(&self) -> Vec<HeadingRef> {
        resolve(&self.document, self.cursor)
            .map(|resolved| classify(&self.document, &resolved.chain))
            .unwrap_or_default()
    }

    #[must_use]
    /// Breadcrumb for the cursor.
    pub fn breadcrumb(&self, composer: &PathComposer) -> BreadcrumbPath {
        composer.compose(&self.headings())
    }

    /// Insert a heading at the cursor against the latest local document.
    ///
    /// # Errors
    ///
    /// Returns the engine's rejection; the session is unchanged in that case.
    pub fn insert_heading(&mut self, level: u8) -> Result<Strategy, OutlineError> {
        let point = InsertionPoint::at(&self.document, self.cursor);
        let anchor = Anchor::at(&self.document, self.cursor).ok_or(
            OutlineError::StaleInsertionPoint {
                pos: point.pos,
                resolved: point.revision,
                current: point.revision,
            },
        )?;
        let edit = insert_heading_with(&self.document, point, &HeadingSpec::new(level))?;

        let mut spec = HeadingSpec::new(level);
        if let Some(id) = edit.stable_id() {
            spec = spec.with_id(id.clone());
        }
        self.pending.push(Intent {
            spec,
            anchor,
            pos: point.pos,
            revision: point.revision,
        });
        let strategy = edit.plan.strategy;
        self.document = edit.document;
        self.cursor = edit.cursor;
        Ok(strategy)
    }

    /// The external engine committed everything pending.
    pub fn confirm(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.pending)
    }

    /// The external engine rejected or rebased the pending commit onto `base`.
    ///
    /// Each pending intent is re-derived from its anchor and re-run in order. Intents whose
    /// heading already exists in `base` are dropped as already applied. Returns how many
    /// intents were replayed.
    ///
    /// # Errors
    ///
    /// Returns [`OutlineError::StaleInsertionPoint`] when an anchor no longer resolves, or the
    /// engine's rejection of a replay. The session then holds `base` plus the intents replayed
    /// before the failure; the failed intent and the ones after it are dropped.
    pub fn rebase(&mut self, base: Document) -> Result<usize, OutlineError> {
        let cursor_anchor = Anchor::at(&self.document, self.cursor);
        let intents = std::mem::take(&mut self.pending);
        self.document = base;
        self.cursor = cursor_anchor
            .and_then(|anchor| anchor.locate(&self.document))
            .unwrap_or(0);

        let mut replayed = 0;
        for intent in intents {
            let already_applied = intent
                .spec
                .id
                .as_ref()
                .is_some_and(|id| self.document.find_by_stable_id(id).is_some());
            if already_applied {
                tracing::debug!(revision = intent.revision, "intent already present in base");
                continue;
            }

            let pos = intent.anchor.locate(&self.document).ok_or(
                OutlineError::StaleInsertionPoint {
                    pos: intent.pos,
                    resolved: intent.revision,
                    current: self.document.revision(),
                },
            )?;
            let point = InsertionPoint::at(&self.document, pos);
            let edit = insert_heading_with(&self.document, point, &intent.spec)?;
            self.document = edit.document;
            self.cursor = edit.cursor;
            self.pending.push(intent);
            replayed += 1;
        }
        tracing::debug!(replayed, "rebased pending intents");
        Ok(replayed)
    }

    /// Move the cursor, stepping over collapsed bodies when the navigator says so.
    pub fn navigate(&mut self, direction: Direction) -> Navigation {
        let navigation = next_cursor_position(
            &self.document,
            Selection::cursor(self.cursor),
            direction,
            &self.collapsed,
        );
        if let Navigation::GapCursor(pos) = navigation {
            self.cursor = pos;
        }
        navigation
    }
}

#[cfg(test)]
#[path = "tests/session.rs"]
mod tests;
