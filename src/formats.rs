//! Format trait and implementations for different document types.
//!
//! This module defines the `Format` trait which abstracts over source formats that can carry an
//! outline (markdown today, org-mode or restructuredtext later) by providing the tree-sitter
//! query that finds headings, how to read a heading's rank and title, and how to write a
//! document back out.

pub mod markdown;

use crate::document::Document;

/// Source format an outline document can be read from and written to.
pub trait Format {
    /// Grammar used to parse the source.
    fn language(&self) -> tree_sitter::Language;
    /// Query capturing every heading node.
    fn heading_query(&self) -> &str;
    /// Rank of a captured heading node.
    fn heading_level(&self, heading: tree_sitter::Node<'_>) -> Option<u8>;
    /// Title text of a captured heading node, without markup.
    fn heading_title<'s>(&self, heading: tree_sitter::Node<'_>, source: &'s str) -> &'s str;
    /// Serialise a document, optionally persisting stable ids alongside titles.
    fn render(&self, doc: &Document, write_ids: bool) -> String;
}
