//! trellis: heading-tree restructuring for containment-nested outline documents.
//!
//! A document encodes its heading hierarchy purely through containment: a heading owns a title
//! and a body, and the body may hold further headings. Rank (H1..H6) is an attribute and need not
//! match nesting depth. The engine reconciles the two when headings are inserted, derives
//! breadcrumbs and deep links from the tree, and steps the cursor over collapsed bodies.
//!
//! The pipeline for an insert is [`position::resolve`] → [`classify::classify`] →
//! [`strategy::decide`] → [`edit_plan::apply`], wrapped by [`edit_plan::insert_heading`].

#![allow(clippy::multiple_crate_versions)]

pub mod breadcrumb;
pub mod classify;
pub mod config;
pub mod document;
pub mod edit_plan;
pub mod error;
pub mod formats;
pub mod input;
pub mod navigator;
pub mod position;
pub mod section;
pub mod session;
pub mod strategy;
pub mod transaction;

pub use breadcrumb::{BreadcrumbPath, PathComposer};
pub use classify::{classify, HeadingRef};
pub use document::{Document, NodeId, StableId};
pub use edit_plan::{insert_heading, Edit, InsertionPoint};
pub use error::OutlineError;
pub use strategy::Strategy;
