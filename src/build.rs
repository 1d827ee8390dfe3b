//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── list_source_files() ──► every .md under src/posts/
//!     │
//!     ├── extract_metadata() ───► Vec<PostMeta>  (parallel, join-all)
//!     │
//!     └── rayon::join
//!             ├── generate_posts()  ──► <filename>.html per post
//!             ├── generate_index()  ──► index.html
//!             └── copy_resources()  ──► template resources/ → public/
//! ```
//!
//! Post and index generation only read the shared metadata list, so they
//! run concurrently; resource copying is independent of both. The build
//! returns once all three converge. Any failure aborts the whole build -
//! there is no partial-success mode.

use crate::{
    config::SiteConfig,
    log, markdown,
    meta::PostMeta,
    render::Renderer,
    utils::fs::copy_dir_recursive,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{fs, path::PathBuf};
use walkdir::WalkDir;

/// Build the entire site: extract metadata, render every post and the
/// index, and copy template resources into the output directory.
///
/// Invoked once for a one-shot build and repeatedly (full re-run, no
/// incremental diffing) by the watch loop.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let files = list_source_files(config)?;
    log!("build"; "found {} posts", files.len());

    let posts = extract_metadata(&files, config)?;
    let renderer = Renderer::from_config(config)?;

    let output = config.output_dir();
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;

    let ((posts_result, index_result), copy_result) = rayon::join(
        || {
            rayon::join(
                || generate_posts(&posts, &renderer, config),
                || generate_index(&posts, &renderer, config),
            )
        },
        || copy_resources(config),
    );

    posts_result?;
    index_result?;
    copy_result?;

    log!("build"; "done");
    Ok(())
}

/// List every Markdown source file under `src/posts/`.
///
/// The listing fully completes before metadata extraction begins. Language
/// subdirectories are swept up by the recursive walk. The walk order is
/// name-sorted so repeated builds visit files identically.
fn list_source_files(config: &SiteConfig) -> Result<Vec<PathBuf>> {
    let posts_dir = config.posts_dir();
    let mut files = Vec::new();

    for entry in WalkDir::new(&posts_dir).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("Failed to list posts in {}", posts_dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Extract front-matter metadata from every source file.
///
/// Per-file extraction is independent; all files are launched together and
/// joined, with the first read failure aborting the whole phase.
fn extract_metadata(files: &[PathBuf], config: &SiteConfig) -> Result<Vec<PostMeta>> {
    files
        .par_iter()
        .map(|path| {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read post {}", path.display()))?;
            Ok(PostMeta::extract(path, &raw, config))
        })
        .collect()
}

/// Render and write one HTML file per post.
///
/// Fan-out/fan-in: every post is processed independently and the function
/// returns only after all of them are written. A single read or write
/// failure fails the whole build.
fn generate_posts(posts: &[PostMeta], renderer: &Renderer, config: &SiteConfig) -> Result<()> {
    let output = config.output_dir();

    posts.par_iter().try_for_each(|meta| {
        let raw = fs::read_to_string(&meta.file)
            .with_context(|| format!("Failed to read post {}", meta.file.display()))?;
        let content = markdown::to_html(&raw);
        let html = renderer.render_post(&content, meta, config)?;

        let dest = output.join(format!("{}.html", meta.filename));
        fs::write(&dest, html)
            .with_context(|| format!("Failed to write post {}", dest.display()))?;
        log!("build"; "generated {}", meta.filename);
        Ok(())
    })
}

/// Render and write `index.html` from the aggregate post list.
///
/// Reads only metadata, so it does not depend on post HTML having been
/// written first. No sort is applied: posts appear in listing order.
fn generate_index(posts: &[PostMeta], renderer: &Renderer, config: &SiteConfig) -> Result<()> {
    let html = renderer.render_index(posts, config)?;
    let dest = config.output_dir().join("index.html");
    fs::write(&dest, html)
        .with_context(|| format!("Failed to write index {}", dest.display()))?;
    log!("build"; "generated index");
    Ok(())
}

/// Copy the active template's `resources/` directory into the output root.
fn copy_resources(config: &SiteConfig) -> Result<()> {
    copy_dir_recursive(&config.resources_dir(), &config.output_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::BTreeMap, path::Path};

    const INDEX_TEMPLATE: &str = "\
<html><body><h1>{{ config.title }}</h1><ul>
{% for post in posts %}<li><a href=\"{{ post.link }}\">{{ post.title }}</a></li>
{% endfor %}</ul></body></html>";

    const POST_TEMPLATE: &str = "\
<html><head><title>{{ post.metadata.title }}</title></head>
<body>{{ post.content }}</body></html>";

    /// Scaffold a minimal site under `root` and return its config.
    fn fixture_site(root: &Path, posts: &[(&str, &str)]) -> SiteConfig {
        fs::create_dir_all(root.join("src/posts")).unwrap();
        fs::create_dir_all(root.join("src/templates/default/resources/css")).unwrap();
        fs::write(
            root.join("cadence.json"),
            r#"{ "template": "default", "title": "Fixture" }"#,
        )
        .unwrap();
        fs::write(
            root.join("src/templates/default/index.html"),
            INDEX_TEMPLATE,
        )
        .unwrap();
        fs::write(root.join("src/templates/default/post.html"), POST_TEMPLATE).unwrap();
        fs::write(
            root.join("src/templates/default/resources/css/main.css"),
            "body { margin: 0 }",
        )
        .unwrap();

        for (name, contents) in posts {
            fs::write(root.join("src/posts").join(name), contents).unwrap();
        }

        let config = SiteConfig::from_root(root).unwrap();
        config.validate().unwrap();
        config
    }

    fn hello_world() -> (&'static str, &'static str) {
        (
            "hello-world.md",
            "<!--\nlayout: post\ntitle: Hello World\n-->\n# Hello World\n\nFirst post.\n",
        )
    }

    /// Snapshot every file in the output directory.
    fn output_snapshot(output: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(output)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                (
                    e.path().strip_prefix(output).unwrap().to_path_buf(),
                    fs::read(e.path()).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_build_generates_post_without_header_block() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_site(dir.path(), &[hello_world()]);

        build_site(&config).unwrap();

        let html =
            fs::read_to_string(dir.path().join("public/hello-world.html")).unwrap();
        assert!(html.contains("<title>Hello World</title>"));
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("First post."));
        assert!(!html.contains("<!--"));
    }

    #[test]
    fn test_index_references_every_post() {
        let dir = tempfile::tempdir().unwrap();
        let posts: Vec<(String, String)> = (1..=4)
            .map(|i| {
                (
                    format!("post-{i}.md"),
                    format!("<!--\ntitle: Post {i}\n-->\nBody {i}\n"),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = posts
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let config = fixture_site(dir.path(), &borrowed);

        build_site(&config).unwrap();

        let index = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        for i in 1..=4 {
            assert!(index.contains(&format!("href=\"/post-{i}.html\"")));
        }
        assert_eq!(index.matches("<li>").count(), 4);
    }

    #[test]
    fn test_resources_copied_into_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_site(dir.path(), &[hello_world()]);

        build_site(&config).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("public/css/main.css")).unwrap(),
            "body { margin: 0 }"
        );
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_site(dir.path(), &[hello_world()]);

        build_site(&config).unwrap();
        let first = output_snapshot(&config.output_dir());

        build_site(&config).unwrap();
        let second = output_snapshot(&config.output_dir());

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_resources_dir_fails_build() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_site(dir.path(), &[hello_world()]);
        fs::remove_dir_all(config.resources_dir()).unwrap();

        assert!(build_site(&config).is_err());
    }

    #[test]
    fn test_missing_template_file_fails_build() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_site(dir.path(), &[hello_world()]);
        fs::remove_file(config.template_dir().join("post.html")).unwrap();

        assert!(build_site(&config).is_err());
    }

    #[test]
    fn test_posts_in_language_subdirs_are_built() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_site(dir.path(), &[]);
        fs::create_dir_all(dir.path().join("src/posts/en")).unwrap();
        fs::write(
            dir.path().join("src/posts/en/localized.md"),
            "<!--\ntitle: Localized\n-->\nContent\n",
        )
        .unwrap();

        build_site(&config).unwrap();

        assert!(dir.path().join("public/localized.html").is_file());
    }

    #[test]
    fn test_post_without_header_still_builds_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture_site(dir.path(), &[("bare.md", "# No header\n")]);

        build_site(&config).unwrap();

        let html = fs::read_to_string(dir.path().join("public/bare.html")).unwrap();
        assert!(html.contains("No header"));
    }
}
