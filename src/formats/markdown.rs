//! Markdown format implementation using tree-sitter-md.
//!
//! Headings are ATX-style (`#` syntax). A stable id may trail the title as a `{#id}` attribute,
//! which is how ids survive a round trip through a plain markdown file.
//!
//! Markdown only nests by rank. A heading ranked at or above the heading that encloses it
//! (which the document model allows) is written in place but comes back as a sibling of that
//! heading when the text is read again. [`misranked_headings`] finds them, and rendering warns
//! about each one.

use crate::document::{Document, NodeId, NodeKind};
use crate::formats::Format;

/// Tree-sitter queries and rendering for ATX-style markdown headings.
pub struct MarkdownFormat;

fn marker_level(kind: &str) -> Option<u8> {
    kind.strip_prefix("atx_h")?
        .strip_suffix("_marker")?
        .parse()
        .ok()
}

impl Format for MarkdownFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn heading_query(&self) -> &'static str {
        "(atx_heading) @heading"
    }

    fn heading_level(&self, heading: tree_sitter::Node<'_>) -> Option<u8> {
        let mut cursor = heading.walk();
        let level = heading
            .children(&mut cursor)
            .find_map(|child| marker_level(child.kind()));
        level
    }

    fn heading_title<'s>(&self, heading: tree_sitter::Node<'_>, source: &'s str) -> &'s str {
        let mut cursor = heading.walk();
        let title = heading
            .children(&mut cursor)
            .find(|child| child.kind() == "inline")
            .and_then(|inline| inline.utf8_text(source.as_bytes()).ok())
            .unwrap_or_default()
            .trim();
        title
    }

    fn render(&self, doc: &Document, write_ids: bool) -> String {
        for heading in misranked_headings(doc) {
            tracing::warn!(
                id = ?doc.stable_id(heading),
                level = ?doc.level(heading),
                "heading does not outrank its enclosing heading and will be re-read as a sibling"
            );
        }
        let mut out = String::new();
        write_blocks(doc, doc.root(), write_ids, &mut out);
        let trimmed = out.trim_end();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\n")
        }
    }
}

#[must_use]
/// Headings whose rank is not deeper than their enclosing heading's, in document order.
pub fn misranked_headings(doc: &Document) -> Vec<NodeId> {
    doc.headings()
        .into_iter()
        .filter(|&heading| {
            let enclosing = doc
                .parent(heading)
                .and_then(|body| doc.parent(body))
                .and_then(|outer| doc.level(outer));
            matches!((doc.level(heading), enclosing), (Some(rank), Some(outer)) if rank <= outer)
        })
        .collect()
}

fn write_blocks(doc: &Document, container: NodeId, write_ids: bool, out: &mut String) {
    for &child in doc.children(container) {
        let Some(node) = doc.get(child) else {
            continue;
        };
        match &node.kind {
            NodeKind::Heading { level, id } => {
                out.push_str(&"#".repeat(usize::from(*level)));
                let title = doc.title(child).unwrap_or_default();
                if !title.is_empty() {
                    out.push(' ');
                    out.push_str(title);
                }
                if write_ids {
                    out.push_str(" {#");
                    out.push_str(id.as_str());
                    out.push('}');
                }
                out.push_str("\n\n");
                write_blocks(doc, doc.container_of(child), write_ids, out);
            }
            NodeKind::Paragraph => {
                out.push_str(node.text.trim_end());
                out.push_str("\n\n");
            }
            NodeKind::Root | NodeKind::Title | NodeKind::Body => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/markdown.rs"]
mod tests;
