//! Cursor movement that steps over collapsed heading bodies.
//!
//! Default cursor movement out of a heading title lands inside the body, which is useless when
//! the body is hidden. When that happens we hand back a gap cursor placed beside the whole
//! subtree instead. Visibility comes from a [`VisibilityOracle`] so any rendering layer can
//! supply it.

use crate::document::{Document, NodeId, NodeKind, StableId};
use crate::position::resolve;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
/// Arrow-key direction.
pub enum Direction {
    /// Previous line.
    Up,
    /// Next line.
    Down,
    /// Previous character.
    Left,
    /// Next character.
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
/// A text selection; anchor and head coincide for a plain cursor.
pub struct Selection {
    /// Fixed end.
    pub anchor: usize,
    /// Moving end.
    pub head: usize,
}

impl Selection {
    #[must_use]
    /// A collapsed cursor at `pos`.
    pub fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    #[must_use]
    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "pos", rename_all = "snake_case")]
/// Outcome of a navigation request.
pub enum Navigation {
    /// Place a gap cursor at this position.
    GapCursor(usize),
    /// Leave movement to the default behaviour.
    NoOp,
}

/// Tells the navigator whether a heading's body is currently hidden.
pub trait VisibilityOracle {
    /// Whether the body of `heading` is collapsed in the current view.
    fn is_collapsed(&self, doc: &Document, heading: NodeId) -> bool;
}

impl<F> VisibilityOracle for F
where
    F: Fn(&Document, NodeId) -> bool,
{
    fn is_collapsed(&self, doc: &Document, heading: NodeId) -> bool {
        self(doc, heading)
    }
}

#[derive(Clone, Debug, Default)]
/// Collapsed headings, tracked by stable id so the state survives restructuring.
pub struct CollapsedSet {
    ids: HashSet<StableId>,
}

impl CollapsedSet {
    #[must_use]
    /// Nothing collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide a heading's body.
    pub fn collapse(&mut self, id: StableId) {
        self.ids.insert(id);
    }

    /// Show a heading's body.
    pub fn expand(&mut self, id: &StableId) {
        self.ids.remove(id);
    }

    /// Flip a heading's state, returning whether it is now collapsed.
    pub fn toggle(&mut self, id: &StableId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    #[must_use]
    /// Whether the heading with this identity is collapsed.
    pub fn contains(&self, id: &StableId) -> bool {
        self.ids.contains(id)
    }
}

impl FromIterator<StableId> for CollapsedSet {
    fn from_iter<I: IntoIterator<Item = StableId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl VisibilityOracle for CollapsedSet {
    fn is_collapsed(&self, doc: &Document, heading: NodeId) -> bool {
        doc.stable_id(heading).is_some_and(|id| self.contains(id))
    }
}

#[must_use]
/// Where a cursor at a heading title boundary should go instead of a hidden body.
///
/// Moving forward out of a title whose body is collapsed yields the gap right after the
/// heading's subtree. Moving backward out of a title whose preceding sibling is collapsed
/// yields the gap between the two. Anything else is [`Navigation::NoOp`]. The result depends
/// only on its inputs, so repeating the call at the same position gives the same answer.
pub fn next_cursor_position(
    doc: &Document,
    selection: Selection,
    direction: Direction,
    oracle: &impl VisibilityOracle,
) -> Navigation {
    if !selection.is_empty() {
        return Navigation::NoOp;
    }
    let Some(resolved) = resolve(doc, selection.head) else {
        return Navigation::NoOp;
    };
    let slot = resolved.parent();
    if !matches!(doc.get(slot.node).map(|n| &n.kind), Some(NodeKind::Title)) {
        return Navigation::NoOp;
    }
    let Some(heading) = doc.parent(slot.node) else {
        return Navigation::NoOp;
    };

    let at_start = slot.index == 0;
    let at_end = slot.index == slot.end - slot.start;
    match direction {
        Direction::Down => past_subtree(doc, heading, oracle),
        Direction::Right if at_end => past_subtree(doc, heading, oracle),
        Direction::Up => before_heading(doc, heading, oracle),
        Direction::Left if at_start => before_heading(doc, heading, oracle),
        Direction::Left | Direction::Right => Navigation::NoOp,
    }
}

fn past_subtree(doc: &Document, heading: NodeId, oracle: &impl VisibilityOracle) -> Navigation {
    if !oracle.is_collapsed(doc, heading) {
        return Navigation::NoOp;
    }
    doc.node_end(heading)
        .map_or(Navigation::NoOp, Navigation::GapCursor)
}

fn before_heading(doc: &Document, heading: NodeId, oracle: &impl VisibilityOracle) -> Navigation {
    let Some(parent) = doc.parent(heading) else {
        return Navigation::NoOp;
    };
    let siblings = doc.children(parent);
    let previous = siblings
        .iter()
        .position(|&c| c == heading)
        .and_then(|i| i.checked_sub(1))
        .map(|i| siblings[i]);
    match previous {
        Some(prev) if doc.is_heading(prev) && oracle.is_collapsed(doc, prev) => doc
            .node_start(heading)
            .map_or(Navigation::NoOp, Navigation::GapCursor),
        _ => Navigation::NoOp,
    }
}

#[cfg(test)]
#[path = "tests/navigator.rs"]
mod tests;
