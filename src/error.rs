//! Error values returned by the outline engine and its host adapters.
//!
//! Every failure is scoped to the single command that produced it: callers decide whether to
//! re-resolve and retry, prompt the user, or abort. Nothing here is fatal to the host process.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Rejections raised before any document mutation takes place.
pub enum OutlineError {
    /// The requested heading rank lies outside H1..H6.
    #[error("heading level {0} is outside the range 1..=6")]
    InvalidLevel(u8),

    /// The insertion point was resolved against a different document state.
    ///
    /// The caller must re-resolve against the latest document and retry.
    #[error("insertion point {pos} is stale (resolved at revision {resolved}, document is at {current})")]
    StaleInsertionPoint {
        /// Offset the caller asked for.
        pos: usize,
        /// Revision the point was resolved against.
        resolved: u64,
        /// Revision of the document it was applied to.
        current: u64,
    },

    /// A split could not find a clean run of nodes to re-parent.
    #[error("cannot split at {pos}: {reason}")]
    AmbiguousSplitBoundary {
        /// Offset of the attempted split.
        pos: usize,
        /// Why no contiguous run boundary exists there.
        reason: &'static str,
    },

    /// A nesting strategy was requested where no heading encloses the insertion point.
    #[error("no heading encloses position {0}")]
    MissingHeadingContext(usize),
}

#[derive(Error, Debug)]
/// Failures while turning source text into an outline document.
pub enum ImportError {
    /// The tree-sitter grammar could not be loaded.
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The heading query did not compile against the grammar.
    #[error("invalid heading query: {0}")]
    Query(#[from] tree_sitter::QueryError),

    /// The parser gave up without producing a tree.
    #[error("parser produced no syntax tree")]
    Parse,

    /// A heading in the source could not be placed in the document.
    #[error(transparent)]
    Outline(#[from] OutlineError),

    /// Reading the source failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
/// Failures while loading `trellis.toml`.
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file is not valid configuration TOML.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// The configured base URL does not parse.
    #[error("invalid base_url: {0}")]
    BaseUrl(#[from] url::ParseError),
}
