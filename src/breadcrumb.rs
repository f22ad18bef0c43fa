//! Breadcrumb paths and deep links derived from a heading chain.
//!
//! Each crumb links to the current page with two query parameters: `h`, a human-readable hint
//! made of the slugs of every preceding ancestor, and `id`, the heading's stable id. Only the
//! id is authoritative; the hint may go stale as titles change.

use crate::classify::HeadingRef;
use crate::document::{Document, NodeId, StableId};
use deunicode::deunicode;
use serde::Serialize;
use url::Url;

/// Query parameter carrying the slug path hint.
pub const HINT_PARAM: &str = "h";
/// Query parameter carrying the stable id.
pub const ID_PARAM: &str = "id";

#[must_use]
/// Lowercase ASCII slug. Non-ASCII letters are transliterated first (`é` to `e`, `ß` to `ss`).
/// Alphanumerics are kept, runs of whitespace and `-` become a single hyphen, and everything
/// else (`_` included) is dropped.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    slug
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One clickable breadcrumb entry.
pub struct Crumb {
    /// Heading title as written.
    pub title: String,
    /// Authoritative identity of the heading.
    pub stable_id: StableId,
    /// Normalised title.
    pub slug: String,
    /// Slugs of all preceding ancestors, each followed by the separator.
    pub path_hint: String,
    /// Deep link to the heading.
    pub url: Url,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
/// Full breadcrumb for a position, root first.
pub struct BreadcrumbPath {
    /// One entry per enclosing heading.
    pub crumbs: Vec<Crumb>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
/// What a breadcrumb widget actually shows.
pub enum DisplayCrumb<'a> {
    /// A clickable entry.
    Link(&'a Crumb),
    /// Stand-in for the collapsed middle. Carries no id or url.
    Ellipsis,
}

impl BreadcrumbPath {
    #[must_use]
    /// Entry for the innermost heading.
    pub fn current(&self) -> Option<&Crumb> {
        self.crumbs.last()
    }

    #[must_use]
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    #[must_use]
    /// Whether the position is at document root level.
    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }

    #[must_use]
    /// Presentation view: paths longer than `limit` show only first, ellipsis and last.
    pub fn truncated(&self, limit: usize) -> Vec<DisplayCrumb<'_>> {
        match self.crumbs.as_slice() {
            [first, .., last] if self.crumbs.len() > limit.max(2) => vec![
                DisplayCrumb::Link(first),
                DisplayCrumb::Ellipsis,
                DisplayCrumb::Link(last),
            ],
            crumbs => crumbs.iter().map(DisplayCrumb::Link).collect(),
        }
    }
}

#[derive(Clone, Debug)]
/// Builds breadcrumbs and deep links against a base page URL.
pub struct PathComposer {
    base: Url,
    separator: String,
    limit: usize,
}

impl PathComposer {
    #[must_use]
    /// Compose links on top of `base`, using `>` as separator and a display limit of 3.
    pub fn new(base: Url) -> Self {
        Self {
            base,
            separator: ">".to_string(),
            limit: 3,
        }
    }

    #[must_use]
    /// Use a different path hint separator.
    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    #[must_use]
    /// Use a different display limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    /// Display limit used by [`PathComposer::display`].
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    /// Turn a heading chain into a breadcrumb, one entry per heading.
    pub fn compose(&self, chain: &[HeadingRef]) -> BreadcrumbPath {
        let mut hint = String::new();
        let mut crumbs = Vec::with_capacity(chain.len());
        for heading in chain {
            let slug = slugify(&heading.title);
            crumbs.push(Crumb {
                title: heading.title.clone(),
                stable_id: heading.stable_id.clone(),
                url: self.link(&hint, &heading.stable_id),
                path_hint: hint.clone(),
                slug: slug.clone(),
            });
            hint.push_str(&slug);
            hint.push_str(&self.separator);
        }
        BreadcrumbPath { crumbs }
    }

    #[must_use]
    /// Presentation view of `path` under this composer's limit.
    pub fn display<'a>(&self, path: &'a BreadcrumbPath) -> Vec<DisplayCrumb<'a>> {
        path.truncated(self.limit)
    }

    #[must_use]
    /// The base URL with `h` and `id` set, keeping any other query parameters.
    pub fn link(&self, hint: &str, id: &StableId) -> Url {
        let kept: Vec<(String, String)> = self
            .base
            .query_pairs()
            .filter(|(key, _)| key != HINT_PARAM && key != ID_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        let mut url = self.base.clone();
        url.set_query(None);
        url.query_pairs_mut()
            .extend_pairs(kept)
            .append_pair(HINT_PARAM, hint)
            .append_pair(ID_PARAM, id.as_str());
        url
    }
}

#[must_use]
/// Find the heading a deep link points at, by its `id` parameter alone.
pub fn resolve_link(doc: &Document, url: &Url) -> Option<NodeId> {
    let (_, id) = url.query_pairs().find(|(key, _)| key == ID_PARAM)?;
    doc.find_by_stable_id(&StableId::from(id.as_ref()))
}

#[cfg(test)]
#[path = "tests/breadcrumb.rs"]
mod tests;
