//! Read source files into outline documents.
//!
//! Headings are located with the format's tree-sitter query and nested by rank the way a reader
//! expects: each heading goes into the body of the nearest preceding heading of lower rank.
//! Text between headings becomes paragraphs, split on blank lines. Every title and paragraph
//! remembers its source line so a line number can be turned back into a position.

use crate::document::{Document, NodeId, StableId};
use crate::error::ImportError;
use crate::formats::Format;
use std::fs;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Parser, Query, QueryCursor};

struct RawHeading<'s> {
    start: usize,
    end: usize,
    line: usize,
    level: u8,
    title: &'s str,
}

/// Read and parse a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsing fails.
pub fn read_document(path: &Path, format: &impl Format) -> Result<Document, ImportError> {
    let source = fs::read_to_string(path)?;
    parse_document(&source, format)
}

/// Parse source text into a document.
///
/// # Errors
///
/// Returns an error if the grammar or heading query cannot be loaded, or the parser yields no
/// tree.
pub fn parse_document(source: &str, format: &impl Format) -> Result<Document, ImportError> {
    let language = format.language();
    let mut parser = Parser::new();
    parser.set_language(&language)?;
    let tree = parser.parse(source, None).ok_or(ImportError::Parse)?;
    let query = Query::new(&language, format.heading_query())?;

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());
    let mut headings = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let node = capture.node;
            let Some(level) = format.heading_level(node) else {
                continue;
            };
            headings.push(RawHeading {
                start: node.start_byte(),
                end: node.end_byte(),
                line: node.start_position().row + 1,
                level,
                title: format.heading_title(node, source),
            });
        }
    }
    headings.sort_by_key(|h| h.start);
    headings.dedup_by_key(|h| h.start);
    tracing::debug!(headings = headings.len(), "extracted headings");

    build(source, &headings)
}

fn build(source: &str, headings: &[RawHeading<'_>]) -> Result<Document, ImportError> {
    let mut doc = Document::new();
    let root = doc.root();
    let preamble_end = headings.first().map_or(source.len(), |h| h.start);
    add_paragraphs(&mut doc, root, source, 0..preamble_end);

    let mut open: Vec<(u8, NodeId)> = Vec::new();
    for (i, raw) in headings.iter().enumerate() {
        while open.last().is_some_and(|&(level, _)| level >= raw.level) {
            open.pop();
        }
        let parent = open.last().map_or(root, |&(_, heading)| heading);
        let (title, id) = split_id_attribute(raw.title);
        let heading = doc.add_heading_with_id(parent, raw.level, title, id)?;
        if let Some(slot) = doc.title_node(heading) {
            doc.set_line(slot, raw.line);
        }

        let body_end = headings.get(i + 1).map_or(source.len(), |next| next.start);
        add_paragraphs(&mut doc, heading, source, raw.end..body_end);
        open.push((raw.level, heading));
    }

    Ok(doc)
}

fn add_paragraphs(doc: &mut Document, parent: NodeId, source: &str, range: std::ops::Range<usize>) {
    let Some(text) = source.get(range.clone()) else {
        return;
    };
    let first_line = source[..range.start].matches('\n').count() + 1;

    let mut chunk: Vec<&str> = Vec::new();
    let mut chunk_line = first_line;
    for (offset, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            flush(doc, parent, &mut chunk, chunk_line);
        } else {
            if chunk.is_empty() {
                chunk_line = first_line + offset;
            }
            chunk.push(line);
        }
    }
    flush(doc, parent, &mut chunk, chunk_line);
}

fn flush(doc: &mut Document, parent: NodeId, chunk: &mut Vec<&str>, line: usize) {
    if chunk.is_empty() {
        return;
    }
    let paragraph = doc.add_paragraph(parent, &chunk.join("\n"));
    doc.set_line(paragraph, line);
    chunk.clear();
}

#[must_use]
/// Split a trailing `{#id}` attribute off a heading title.
pub fn split_id_attribute(title: &str) -> (&str, Option<StableId>) {
    let trimmed = title.trim_end();
    let Some(inner) = trimmed.strip_suffix('}') else {
        return (trimmed, None);
    };
    let Some(open) = inner.rfind("{#") else {
        return (trimmed, None);
    };
    let id = &inner[open + 2..];
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return (trimmed, None);
    }
    (trimmed[..open].trim_end(), Some(StableId::from(id)))
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
