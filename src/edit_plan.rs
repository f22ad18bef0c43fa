//! The edit plan turns a chosen insertion strategy into one atomic document transaction.
//!
//! Planning resolves the insertion point, finds the target container and index, and for a split
//! works out which run of siblings moves under the new heading. Applying the plan stages every
//! step in a single [`Transaction`], so either the whole restructuring lands or none of it does.

use crate::classify::{classify, HeadingRef};
use crate::document::{validate_level, Document, NodeId, StableId};
use crate::error::OutlineError;
use crate::position::{resolve, ResolvedPos};
use crate::strategy::{body_boundary, decide, next_sibling_heading, Boundary, Strategy};
use crate::transaction::Transaction;
use serde::Serialize;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Description of the heading to create.
pub struct HeadingSpec {
    /// Rank, 1..=6.
    pub level: u8,
    /// Initial title text, usually empty.
    pub title: String,
    /// Identity to reuse, e.g. when replaying an intent after a rejected commit.
    pub id: Option<StableId>,
}

impl HeadingSpec {
    #[must_use]
    /// An untitled heading at `level`.
    pub fn new(level: u8) -> Self {
        Self {
            level,
            title: String::new(),
            id: None,
        }
    }

    #[must_use]
    /// Set the initial title.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    #[must_use]
    /// Reuse an existing identity.
    pub fn with_id(mut self, id: StableId) -> Self {
        self.id = Some(id);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
/// An offset pinned to the document revision it was resolved against.
pub struct InsertionPoint {
    /// Raw offset.
    pub pos: usize,
    /// Revision of the document `pos` refers to.
    pub revision: u64,
}

impl InsertionPoint {
    #[must_use]
    /// Pin `pos` to the current revision of `doc`.
    pub fn at(doc: &Document, pos: usize) -> Self {
        Self {
            pos,
            revision: doc.revision(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Where a new heading goes and which existing nodes move with it.
pub struct EditPlan {
    /// Strategy being executed.
    pub strategy: Strategy,
    /// Container receiving the new heading.
    pub container: NodeId,
    /// Child index of the new heading within `container`.
    pub index: usize,
    /// Children of `container` that become the new heading's body (empty unless splitting).
    pub moved: Range<usize>,
}

#[derive(Clone, Debug)]
/// Outcome of a successful insertion.
pub struct Edit {
    /// The next document snapshot.
    pub document: Document,
    /// Cursor placement inside the new heading's title.
    pub cursor: usize,
    /// The new heading.
    pub heading: NodeId,
    /// What was executed.
    pub plan: EditPlan,
}

impl Edit {
    #[must_use]
    /// Identity of the new heading.
    pub fn stable_id(&self) -> Option<&StableId> {
        self.document.stable_id(self.heading)
    }
}

fn resolve_point(doc: &Document, point: InsertionPoint) -> Result<ResolvedPos, OutlineError> {
    let stale = OutlineError::StaleInsertionPoint {
        pos: point.pos,
        resolved: point.revision,
        current: doc.revision(),
    };
    if point.revision != doc.revision() {
        return Err(stale);
    }
    resolve(doc, point.pos).ok_or(stale)
}

/// Work out where a heading of `level` goes under `strategy`, without touching the document.
///
/// # Errors
///
/// - [`OutlineError::InvalidLevel`] for ranks outside H1..H6
/// - [`OutlineError::StaleInsertionPoint`] when `point` belongs to another revision or no
///   longer resolves
/// - [`OutlineError::MissingHeadingContext`] for a child or split with no enclosing heading
/// - [`OutlineError::AmbiguousSplitBoundary`] when a split has no clean run to move
pub fn plan(
    strategy: Strategy,
    doc: &Document,
    point: InsertionPoint,
    level: u8,
) -> Result<EditPlan, OutlineError> {
    let level = validate_level(level)?;
    let resolved = resolve_point(doc, point)?;
    let headings = classify(doc, &resolved.chain);

    let Some(current) = headings.last() else {
        if strategy != Strategy::Sibling {
            return Err(OutlineError::MissingHeadingContext(point.pos));
        }
        let root = doc.root();
        return Ok(EditPlan {
            strategy,
            container: root,
            index: doc.children(root).len(),
            moved: 0..0,
        });
    };

    match strategy {
        Strategy::Sibling => {
            let container = doc.parent(current.node).unwrap_or(doc.root());
            let siblings = doc.children(container);
            let index = siblings
                .iter()
                .position(|&c| c == current.node)
                .map_or(siblings.len(), |i| i + 1);
            Ok(EditPlan {
                strategy,
                container,
                index,
                moved: 0..0,
            })
        }
        Strategy::Child => {
            let body = doc.container_of(current.node);
            Ok(EditPlan {
                strategy,
                container: body,
                index: doc.children(body).len(),
                moved: 0..0,
            })
        }
        Strategy::Split => split_plan(doc, &resolved, current, level),
    }
}

fn split_plan(
    doc: &Document,
    resolved: &ResolvedPos,
    current: &HeadingRef,
    level: u8,
) -> Result<EditPlan, OutlineError> {
    let ambiguous = |reason| OutlineError::AmbiguousSplitBoundary {
        pos: resolved.pos,
        reason,
    };
    // Inside a paragraph, the run starts at the node after it.
    let start = body_boundary(doc, resolved, current)
        .map(Boundary::scan_from)
        .ok_or_else(|| ambiguous("insertion point is outside the heading body"))?;

    let body = doc.container_of(current.node);
    let mut end = start;
    let mut deeper = false;
    for &child in doc.children(body).iter().skip(start) {
        match doc.level(child) {
            Some(rank) if rank <= level => break,
            Some(_) => deeper = true,
            None => {}
        }
        end += 1;
    }
    if !deeper {
        return Err(ambiguous("no deeper heading follows the insertion point"));
    }

    Ok(EditPlan {
        strategy: Strategy::Split,
        container: body,
        index: start,
        moved: start..end,
    })
}

/// Execute `strategy` for a new heading as a single transaction.
///
/// # Errors
///
/// Every rejection listed on [`plan`]; the input document is never modified.
pub fn apply(
    strategy: Strategy,
    doc: &Document,
    point: InsertionPoint,
    spec: &HeadingSpec,
) -> Result<Edit, OutlineError> {
    let plan = plan(strategy, doc, point, spec.level)?;
    tracing::debug!(
        strategy = ?plan.strategy,
        container = plan.container.0,
        index = plan.index,
        moved = plan.moved.len(),
        "applying heading insertion"
    );

    let mut tx = Transaction::new(doc);
    let heading = tx.create_heading(spec.level, &spec.title, spec.id.clone())?;
    if !plan.moved.is_empty() {
        let run = tx.remove_range(plan.container, plan.moved.clone());
        let body = tx.doc().container_of(heading);
        tx.insert_into(body, 0, run);
    }
    tx.insert_into(plan.container, plan.index, vec![heading]);
    let document = tx.commit();

    let cursor = document
        .title_node(heading)
        .and_then(|title| Some(document.content_start(title)? + document.content_size(title)))
        .unwrap_or(point.pos);

    Ok(Edit {
        document,
        cursor,
        heading,
        plan,
    })
}

/// Insert an untitled heading at `level`, choosing the strategy from the surrounding tree.
///
/// # Errors
///
/// Every rejection listed on [`plan`].
pub fn insert_heading(
    doc: &Document,
    point: InsertionPoint,
    level: u8,
) -> Result<Edit, OutlineError> {
    insert_heading_with(doc, point, &HeadingSpec::new(level))
}

/// Insert the heading described by `spec`, choosing the strategy from the surrounding tree.
///
/// # Errors
///
/// Every rejection listed on [`plan`].
pub fn insert_heading_with(
    doc: &Document,
    point: InsertionPoint,
    spec: &HeadingSpec,
) -> Result<Edit, OutlineError> {
    validate_level(spec.level)?;
    let resolved = resolve_point(doc, point)?;
    let headings = classify(doc, &resolved.chain);
    let current = headings.last();
    let next = current.and_then(|heading| next_sibling_heading(doc, &resolved, heading));
    let strategy = decide(current, next.as_ref(), spec.level);
    tracing::debug!(
        level = spec.level,
        current = current.map(|h| h.level),
        next = next.as_ref().map(|h| h.level),
        ?strategy,
        "decided insertion strategy"
    );
    apply(strategy, doc, point, spec)
}

#[cfg(test)]
#[path = "tests/edit_plan.rs"]
mod tests;
