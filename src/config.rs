//! Site configuration module.
//!
//! Handles loading and validating `config.toml` from the content
//! directory. Configuration is deliberately an explicit value passed into
//! the pipeline (the [`crate::posts::PostService`] constructor takes it),
//! never ambient process state — the core stays testable without
//! environment mocking.
//!
//! ## Configuration Options
//!
//! ```toml
//! # The workspace page id of the blog database. Bare or hyphenated.
//! root_page_id = "0a1b2c3d4e5f60718293a4b5c6d7e8f9"
//!
//! # Order the listing newest-first (default). Turn off to keep the
//! # collection view's curated order.
//! sort_by_date = true
//!
//! title = "A Quiet Corner"
//! author = "A. Author"
//!
//! # Card-grid regrouping rules, applied to the rendered tree of the
//! # named page. `pattern` is "name-image" (strict sub-heading/portrait
//! # pairs) or "name-subtitle-image" (optional subtitle and image).
//! [[grids]]
//! page = "about"
//! section = "Residents & Alumni"
//! pattern = "name-image"
//!
//! [[grids]]
//! page = "home"
//! section = "Guest Speakers"
//! pattern = "name-subtitle-image"
//! ```
//!
//! All options are optional; a missing `config.toml` yields defaults.
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::record;
use crate::regroup::GridRule;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// User config files need only specify the values they want to override.
/// Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Workspace id of the database page that holds the blog posts.
    /// Empty means unconfigured; listings degrade to empty.
    pub root_page_id: String,
    /// Sort the post listing by date, newest first.
    pub sort_by_date: bool,
    /// Site title, for page shells and feeds.
    pub title: String,
    /// Site author, for bylines.
    pub author: String,
    /// Card-grid regrouping rules (see [`crate::regroup`]).
    pub grids: Vec<GridRule>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_page_id: String::new(),
            sort_by_date: true,
            title: String::new(),
            author: String::new(),
            grids: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    ///
    /// A set-but-malformed root id is a validation error (an *unset* id
    /// is legal and degrades at the service boundary instead, so fresh
    /// checkouts still build).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root_page_id.is_empty() && record::canonical_id(&self.root_page_id).is_none() {
            return Err(ConfigError::Validation(format!(
                "root_page_id \"{}\" is not a 32-hex-digit page id",
                self.root_page_id
            )));
        }
        for rule in &self.grids {
            if rule.page.is_empty() || rule.section.is_empty() {
                return Err(ConfigError::Validation(
                    "grid rules need a non-empty page and section".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Load `config.toml` from the content directory.
///
/// Missing file yields defaults; a present-but-invalid file is an error
/// (silent fallback would mask typos).
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let path = dir.join("config.toml");
    if !path.exists() {
        return Ok(SiteConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regroup::CardPattern;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) {
        fs::write(dir.path().join("config.toml"), content).unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert!(config.root_page_id.is_empty());
        assert!(config.sort_by_date);
        assert!(config.grids.is_empty());
    }

    #[test]
    fn partial_config_overrides_only_named_values() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "sort_by_date = false\n");

        let config = load_config(dir.path()).unwrap();
        assert!(!config.sort_by_date);
        assert!(config.root_page_id.is_empty());
    }

    #[test]
    fn grid_rules_parse_with_kebab_case_patterns() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
root_page_id = "0a1b2c3d4e5f60718293a4b5c6d7e8f9"

[[grids]]
page = "about"
section = "Residents & Alumni"
pattern = "name-image"

[[grids]]
page = "home"
section = "Guest Speakers"
pattern = "name-subtitle-image"
"#,
        );

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.grids.len(), 2);
        assert_eq!(config.grids[0].pattern, CardPattern::NameImage);
        assert_eq!(config.grids[1].pattern, CardPattern::NameSubtitleImage);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "sort_by_dates = true\n");
        assert!(matches!(load_config(dir.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn malformed_root_id_fails_validation() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "root_page_id = \"nope\"\n");
        assert!(matches!(
            load_config(dir.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_root_id_is_legal() {
        let config = SiteConfig::default();
        assert!(config.validate().is_ok());
    }
}
