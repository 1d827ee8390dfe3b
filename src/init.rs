//! Site scaffolding and content stubs.
//!
//! Three commands live here:
//!
//! - `init` creates the site skeleton (directory structure, default
//!   template, starter post, manifest).
//! - `config` runs an interactive wizard over the manifest.
//! - `new` writes a front-matter-stubbed Markdown file per configured
//!   language.

use crate::{
    cli::FileKind,
    config::{layout, SiteConfig},
    log,
    utils::slug::title_to_filename,
};
use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use dialoguer::Input;
use std::{fs, path::Path};

/// Default site directory structure.
const SITE_DIRS: &[&str] = &[
    layout::POSTS,
    layout::PAGES,
    "src/templates/default/resources/css",
    layout::OUTPUT,
];

/// Default template shipped inside the binary.
const DEFAULT_INDEX: &str = include_str!("embed/template/index.html");
const DEFAULT_POST: &str = include_str!("embed/template/post.html");
const DEFAULT_CSS: &str = include_str!("embed/template/resources/main.css");
const WELCOME_POST: &str = include_str!("embed/welcome.md");

// ============================================================================
// init
// ============================================================================

/// Create a new site skeleton at `root`.
///
/// Writes the directory structure, the embedded default template, a
/// starter post, and a manifest with default values. Refuses to touch a
/// directory that already has a manifest.
pub fn init_site(root: &Path) -> Result<()> {
    if root.join(crate::config::MANIFEST_FILE).exists() {
        bail!(
            "`{}` already contains a manifest. Remove it first or init elsewhere.",
            root.display()
        );
    }

    for dir in SITE_DIRS {
        let path = root.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }

    let template_dir = root.join("src/templates/default");
    fs::write(template_dir.join("index.html"), DEFAULT_INDEX)?;
    fs::write(template_dir.join("post.html"), DEFAULT_POST)?;
    fs::write(template_dir.join("resources/css/main.css"), DEFAULT_CSS)?;
    fs::write(root.join(layout::POSTS).join("welcome.md"), WELCOME_POST)?;

    write_manifest(root, &SiteConfig::default())?;

    log!("init"; "site skeleton created at {}", root.display());
    Ok(())
}

fn write_manifest(root: &Path, config: &SiteConfig) -> Result<()> {
    let manifest = root.join(crate::config::MANIFEST_FILE);
    let content = serde_json::to_string_pretty(config)?;
    fs::write(&manifest, content)
        .with_context(|| format!("Failed to write {}", manifest.display()))?;
    Ok(())
}

// ============================================================================
// config wizard
// ============================================================================

/// Interactive manifest editor.
///
/// Prompts for the common fields with the current (or default) values as
/// fallbacks, then rewrites the manifest. Hitting enter keeps a value.
pub fn config_wizard(root: &Path) -> Result<()> {
    let mut config = if root.join(crate::config::MANIFEST_FILE).exists() {
        SiteConfig::from_root(root)?
    } else {
        SiteConfig::default()
    };

    log!("config"; "hit enter to keep the value in parentheses");

    config.name = prompt("Site name", &config.name)?;
    config.title = prompt("Title", &config.title)?;
    config.subtitle = prompt("Subtitle", &config.subtitle)?;
    config.description = prompt("Description", &config.description)?;
    config.author = prompt("Author", &config.author)?;
    config.bio = prompt("Author bio", &config.bio)?;
    config.domain = prompt("Domain", &config.domain)?;
    config.template = prompt("Template", &config.template)?;
    config.preprocessor = prompt("Preprocessor", &config.preprocessor)?;

    write_manifest(root, &config)?;
    log!("config"; "manifest written to {}", root.display());
    Ok(())
}

fn prompt(label: &str, default: &str) -> Result<String> {
    let value: String = Input::new()
        .with_prompt(label)
        .default(default.to_owned())
        .interact_text()
        .context("Prompt aborted")?;
    Ok(value)
}

// ============================================================================
// new post/page
// ============================================================================

/// Create a stub Markdown file for a new post or page.
///
/// One copy is written per configured language, under
/// `src/{posts,pages}/<language>/<slug>.md`, mirroring how multilingual
/// content is organized.
pub fn new_file(config: &SiteConfig, kind: FileKind, title: &str, open: bool) -> Result<()> {
    let stem = title_to_filename(title);
    if stem.is_empty() {
        bail!("Title `{title}` produces an empty filename");
    }

    let base_dir = match kind {
        FileKind::Post => config.posts_dir(),
        FileKind::Page => config.pages_dir(),
    };
    let stub = file_stub(kind, title);

    for lang in &config.i18n.languages {
        let dir = base_dir.join(lang);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(format!("{stem}.md"));
        fs::write(&path, &stub)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if open {
            crate::utils::open::open_external(&path.to_string_lossy())?;
        }
    }

    log!("new"; "{} \"{title}\" created in {}", kind.as_str(), base_dir.display());
    Ok(())
}

/// Front-matter stub for a freshly created file.
fn file_stub(kind: FileKind, title: &str) -> String {
    let date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        "<!--\n\
         layout: {kind}\n\
         title: {title}\n\
         date: {date}\n\
         comments: true\n\
         published: true\n\
         keywords:\n\
         description:\n\
         categories:\n\
         -->\n\
         # {title}\n",
        kind = kind.as_str(),
    )
}
