//! Site configuration management for `cadence.json`.
//!
//! The manifest is a single JSON object at the site root:
//!
//! ```json
//! {
//!     "name": "Awesome website",
//!     "title": "My awesome static website",
//!     "author": "Alice",
//!     "template": "default",
//!     "header_tokens": ["<!--", "-->"],
//!     "i18n": { "default": "en", "languages": ["en"] }
//! }
//! ```
//!
//! The loaded [`SiteConfig`] is immutable for the duration of a build and is
//! threaded as an explicit parameter into every component entry point.

use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Manifest file name expected at the site root.
pub const MANIFEST_FILE: &str = "cadence.json";

/// Directory layout of a site, relative to its root.
pub mod layout {
    pub const POSTS: &str = "src/posts";
    pub const PAGES: &str = "src/pages";
    pub const TEMPLATES: &str = "src/templates";
    pub const OUTPUT: &str = "public";
}

// ============================================================================
// Errors
// ============================================================================

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Manifest parsing error")]
    Json(#[from] serde_json::Error),

    #[error("Manifest validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Defaults
// ============================================================================

/// Default values for manifest fields.
///
/// These functions are used by serde for default deserialization and by the
/// config wizard as prompt fallbacks.
pub mod defaults {
    pub fn name() -> String {
        "Awesome website".into()
    }

    pub fn title() -> String {
        "My awesome static website".into()
    }

    pub fn subtitle() -> String {
        "Powered by Cadence".into()
    }

    pub fn description() -> String {
        "This is the description".into()
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn bio() -> String {
        "Thats me".into()
    }

    pub fn domain() -> String {
        "http://awesome.com".into()
    }

    pub fn template() -> String {
        String::new()
    }

    pub fn preprocessor() -> String {
        "stylus".into()
    }

    pub fn posts_permalink() -> String {
        ":language/:year/:month/:title".into()
    }

    pub fn pages_permalink() -> String {
        "pages/:title".into()
    }

    pub fn header_tokens() -> [String; 2] {
        ["<!--".into(), "-->".into()]
    }

    pub fn index_posts() -> usize {
        10
    }

    pub mod i18n {
        pub fn default() -> String {
            "en".into()
        }

        pub fn languages() -> Vec<String> {
            vec!["en".into()]
        }
    }
}

// ============================================================================
// i18n section
// ============================================================================

/// `i18n` object in cadence.json - language settings.
///
/// `languages` drives `cadence new`: one stub file is written per language
/// directory under `src/posts/` or `src/pages/`.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct I18nConfig {
    /// Language served at the site root.
    #[serde(default = "defaults::i18n::default")]
    #[educe(Default = defaults::i18n::default())]
    pub default: String,

    /// All languages content is authored in.
    #[serde(default = "defaults::i18n::languages")]
    #[educe(Default = defaults::i18n::languages())]
    pub languages: Vec<String>,
}

// ============================================================================
// Root configuration
// ============================================================================

/// Root configuration structure representing cadence.json.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the site root (set after loading).
    #[serde(skip)]
    root: PathBuf,

    /// Site name shown in templates.
    #[serde(default = "defaults::name")]
    #[educe(Default = defaults::name())]
    pub name: String,

    /// Site title displayed in browser tab and headers.
    #[serde(default = "defaults::title")]
    #[educe(Default = defaults::title())]
    pub title: String,

    /// Site subtitle for template headers.
    #[serde(default = "defaults::subtitle")]
    #[educe(Default = defaults::subtitle())]
    pub subtitle: String,

    /// Site description for meta tags.
    #[serde(default = "defaults::description")]
    #[educe(Default = defaults::description())]
    pub description: String,

    /// Author name shown in templates.
    #[serde(default = "defaults::author")]
    #[educe(Default = defaults::author())]
    pub author: String,

    /// Author bio shown in templates.
    #[serde(default = "defaults::bio")]
    #[educe(Default = defaults::bio())]
    pub bio: String,

    /// Public domain of the site.
    #[serde(default = "defaults::domain")]
    #[educe(Default = defaults::domain())]
    pub domain: String,

    /// Active template name under `src/templates/`. Required.
    #[serde(default = "defaults::template")]
    #[educe(Default = String::from("default"))]
    pub template: String,

    /// CSS preprocessor used by the template.
    #[serde(default = "defaults::preprocessor")]
    #[educe(Default = defaults::preprocessor())]
    pub preprocessor: String,

    /// Permalink pattern for posts.
    #[serde(default = "defaults::posts_permalink")]
    #[educe(Default = defaults::posts_permalink())]
    pub posts_permalink: String,

    /// Permalink pattern for pages.
    #[serde(default = "defaults::pages_permalink")]
    #[educe(Default = defaults::pages_permalink())]
    pub pages_permalink: String,

    /// Open/close delimiters of the front-matter header block.
    #[serde(default = "defaults::header_tokens")]
    #[educe(Default = defaults::header_tokens())]
    pub header_tokens: [String; 2],

    /// Number of posts the index template may show.
    #[serde(default = "defaults::index_posts")]
    #[educe(Default = defaults::index_posts())]
    pub index_posts: usize,

    /// Language settings.
    #[serde(default)]
    pub i18n: I18nConfig,
}

impl SiteConfig {
    /// Parse configuration from a JSON string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from the manifest at `<root>/cadence.json`.
    ///
    /// The returned config has its root set; call [`SiteConfig::validate`]
    /// before starting a build.
    pub fn from_root(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(MANIFEST_FILE);
        let content =
            fs::read_to_string(&path).map_err(|err| ConfigError::Io(path.clone(), err))?;
        let mut config = Self::from_str(&content)?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    ///
    /// Runs before any build I/O so a broken manifest never produces a
    /// half-written output directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.template.trim().is_empty() {
            return Err(ConfigError::Validation(
                "manifest is missing the `template` key".into(),
            ));
        }
        let [open, close] = &self.header_tokens;
        if open.is_empty() || close.is_empty() {
            return Err(ConfigError::Validation(
                "`header_tokens` must contain two non-empty delimiters".into(),
            ));
        }
        if self.i18n.languages.is_empty() {
            return Err(ConfigError::Validation(
                "`i18n.languages` must list at least one language".into(),
            ));
        }
        Ok(())
    }

    /// Get the site root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Set the site root directory path.
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// `<root>/cadence.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// `<root>/src/posts`
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(layout::POSTS)
    }

    /// `<root>/src/pages`
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(layout::PAGES)
    }

    /// `<root>/src/templates/<template>`
    pub fn template_dir(&self) -> PathBuf {
        self.root.join(layout::TEMPLATES).join(&self.template)
    }

    /// `<root>/src/templates/<template>/resources`
    pub fn resources_dir(&self) -> PathBuf {
        self.template_dir().join("resources")
    }

    /// `<root>/public`
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(layout::OUTPUT)
    }

    /// Front-matter opening delimiter.
    pub fn header_open(&self) -> &str {
        &self.header_tokens[0]
    }

    /// Front-matter closing delimiter.
    pub fn header_close(&self) -> &str {
        &self.header_tokens[1]
    }
}
