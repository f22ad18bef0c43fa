//! Choose how a new heading joins the tree: beside, beneath, or splitting its parent's body.

use crate::classify::{heading_ref, HeadingRef};
use crate::document::Document;
use crate::position::ResolvedPos;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// How an incoming heading is placed relative to the heading enclosing the cursor.
pub enum Strategy {
    /// Insert after the enclosing heading's subtree, at the same nesting depth.
    Sibling,
    /// Append to the end of the enclosing heading's body.
    Child,
    /// Insert at the cursor and re-parent the deeper content that follows it.
    Split,
}

#[must_use]
/// Compare an incoming rank against the enclosing heading and the heading that follows.
///
/// - no enclosing heading, or a rank at or above it: [`Strategy::Sibling`]
/// - deeper than the enclosing heading, with a following heading deeper still:
///   [`Strategy::Split`], since that content belongs under the new heading
/// - otherwise: [`Strategy::Child`]
pub fn decide(
    current: Option<&HeadingRef>,
    next_sibling: Option<&HeadingRef>,
    incoming_level: u8,
) -> Strategy {
    let Some(current) = current else {
        return Strategy::Sibling;
    };
    if incoming_level <= current.level {
        return Strategy::Sibling;
    }
    match next_sibling {
        Some(next) if next.level > incoming_level => Strategy::Split,
        _ => Strategy::Child,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Where a position falls among the children of a heading's body.
pub enum Boundary {
    /// Exactly before child `n` (or at the end when `n` is the child count).
    Between(usize),
    /// Somewhere in the middle of child `n`'s text.
    Inside(usize),
}

impl Boundary {
    #[must_use]
    /// First body child that lies wholly after the position.
    pub fn scan_from(self) -> usize {
        match self {
            Self::Between(index) => index,
            Self::Inside(index) => index + 1,
        }
    }
}

#[must_use]
/// Locate a resolved position within the body of `heading`, which must enclose it.
///
/// A cursor in the title, or between title and body, counts as the start of the body.
pub fn body_boundary(
    doc: &Document,
    resolved: &ResolvedPos,
    heading: &HeadingRef,
) -> Option<Boundary> {
    let depth = resolved
        .chain
        .iter()
        .position(|ancestor| ancestor.node == heading.node)?;
    let body = doc.body_node(heading.node)?;

    let Some(slot) = resolved.chain.get(depth + 1) else {
        let index = resolved.chain[depth].index;
        return Some(if index <= 1 {
            Boundary::Between(0)
        } else {
            Boundary::Between(doc.children(body).len())
        });
    };
    if slot.node != body {
        return Some(Boundary::Between(0));
    }

    let Some(block) = resolved.chain.get(depth + 2) else {
        return Some(Boundary::Between(slot.index));
    };
    Some(if block.index == 0 {
        Boundary::Between(slot.index)
    } else if block.index == block.end - block.start {
        Boundary::Between(slot.index + 1)
    } else {
        Boundary::Inside(slot.index)
    })
}

#[must_use]
/// The first heading following the position among the children of `current`'s body.
pub fn next_sibling_heading(
    doc: &Document,
    resolved: &ResolvedPos,
    current: &HeadingRef,
) -> Option<HeadingRef> {
    let body = doc.body_node(current.node)?;
    let from = body_boundary(doc, resolved, current)?.scan_from();
    doc.children(body)
        .iter()
        .skip(from)
        .find(|&&child| doc.is_heading(child))
        .and_then(|&child| heading_ref(doc, child))
}

#[cfg(test)]
#[path = "tests/strategy.rs"]
mod tests;
