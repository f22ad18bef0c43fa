//! Configuration for breadcrumb links and markdown output.
//!
//! We look for a trellis.toml in the working directory (or the path given with `--config`) and
//! load settings from there. Missing keys fall back to the defaults declared on each field.

use crate::breadcrumb::PathComposer;
use crate::error::ConfigError;
use facet::Facet;
use std::fs;
use std::path::Path;
use url::Url;

/// File consulted when no explicit configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = "trellis.toml";

#[derive(Facet, Clone)]
/// User preferences loaded from trellis.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "https://localhost/".to_string())]
    /// Page URL that deep links are built on.
    pub base_url: String,
    #[facet(default = ">".to_string())]
    /// Text placed after each slug in a breadcrumb path hint.
    pub separator: String,
    #[facet(default = 3)]
    /// Longest breadcrumb shown in full before collapsing the middle.
    pub breadcrumb_limit: usize,
    #[facet(default = "…".to_string())]
    /// Label of the collapsed middle of a long breadcrumb.
    pub ellipsis: String,
    #[facet(default = true)]
    /// Write stable ids back into markdown as `{#id}` heading attributes.
    pub write_ids: bool,
}

impl Config {
    /// Load configuration from `path`, or from trellis.toml if present.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be read, or if the contents do not
    /// parse as configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let contents = match path {
            Some(path) => fs::read_to_string(path)?,
            None => fs::read_to_string(DEFAULT_CONFIG_FILE).unwrap_or_default(),
        };
        Self::parse(&contents)
    }

    /// Parse configuration TOML, filling in defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        facet_toml::from_str::<Self>(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Build the breadcrumb composer described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BaseUrl`] when `base_url` is not an absolute URL.
    pub fn composer(&self) -> Result<PathComposer, ConfigError> {
        let base = Url::parse(&self.base_url)?;
        Ok(PathComposer::new(base)
            .with_separator(&self.separator)
            .with_limit(self.breadcrumb_limit))
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
