//! HTML template rendering.
//!
//! The active template contributes two files, compiled once per build:
//!
//! | File         | Context               | Output                  |
//! |--------------|-----------------------|-------------------------|
//! | `post.html`  | `{ post, config }`    | one page per post       |
//! | `index.html` | `{ posts, config }`   | the single `index.html` |
//!
//! `post.content` is the Markdown body rendered to HTML and `post.metadata`
//! the front-matter mapping. After rendering a post page, any residual
//! header comment block left in the output is removed with a pattern match;
//! that cleanup belongs to the pipeline, not to the templating engine.

use crate::{config::SiteConfig, meta::PostMeta};
use minijinja::{context, Environment};
use regex::Regex;
use std::{borrow::Cow, fs, io, path::PathBuf};
use thiserror::Error;

/// Template-related errors. All fatal for the current build.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("failed to compile template `{name}`")]
    Compile {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render template `{name}`")]
    Render {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Compiled templates of the active theme, plus the residual-header pattern.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
    header_pattern: Regex,
}

impl Renderer {
    /// Load and compile `index.html` and `post.html` from the active
    /// template directory.
    pub fn from_config(config: &SiteConfig) -> Result<Self, TemplateError> {
        let dir = config.template_dir();
        let mut env = Environment::new();

        for name in ["index", "post"] {
            let path = dir.join(format!("{name}.html"));
            let source =
                fs::read_to_string(&path).map_err(|err| TemplateError::Io(path.clone(), err))?;
            env.add_template_owned(name, source)
                .map_err(|source| TemplateError::Compile { name, source })?;
        }

        Ok(Self {
            env,
            header_pattern: header_pattern(config.header_open(), config.header_close()),
        })
    }

    /// Render one post page and strip any residual header comment block.
    pub fn render_post(
        &self,
        content: &str,
        metadata: &PostMeta,
        config: &SiteConfig,
    ) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template("post")
            .map_err(|source| TemplateError::Render { name: "post", source })?;

        let html = template
            .render(context! {
                post => context! { content => content, metadata => metadata },
                config => config,
            })
            .map_err(|source| TemplateError::Render { name: "post", source })?;

        Ok(self.strip_residual_header(&html).into_owned())
    }

    /// Render the index page from the aggregate post list.
    pub fn render_index(
        &self,
        posts: &[PostMeta],
        config: &SiteConfig,
    ) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template("index")
            .map_err(|source| TemplateError::Render { name: "index", source })?;

        template
            .render(context! { posts => posts, config => config })
            .map_err(|source| TemplateError::Render { name: "index", source })
    }

    /// Remove header-token-delimited blocks remaining in rendered output.
    pub fn strip_residual_header<'a>(&self, html: &'a str) -> Cow<'a, str> {
        self.header_pattern.replace_all(html, "")
    }
}

/// Build the residual-header pattern from the configured delimiters.
fn header_pattern(open: &str, close: &str) -> Regex {
    let pattern = format!("{}[\\s\\S]*?{}", regex::escape(open), regex::escape(close));
    // Both tokens are escaped, so the pattern is always valid.
    Regex::new(&pattern).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const POST_TEMPLATE: &str = "\
<html><head><title>{{ post.metadata.title }} - {{ config.title }}</title></head>
<body>{{ post.content }}</body></html>";

    const INDEX_TEMPLATE: &str = "\
<html><body><ul>
{% for post in posts %}<li><a href=\"{{ post.link }}\">{{ post.title }}</a></li>
{% endfor %}</ul></body></html>";

    fn site(dir: &Path) -> SiteConfig {
        let mut config =
            SiteConfig::from_str(r#"{ "template": "default", "title": "Test Site" }"#).unwrap();
        config.set_root(dir);
        config
    }

    fn write_templates(dir: &Path, index: &str, post: &str) {
        let template_dir = dir.join("src/templates/default");
        fs::create_dir_all(&template_dir).unwrap();
        fs::write(template_dir.join("index.html"), index).unwrap();
        fs::write(template_dir.join("post.html"), post).unwrap();
    }

    fn meta(raw: &str, file: &str, config: &SiteConfig) -> PostMeta {
        PostMeta::extract(Path::new(file), raw, config)
    }

    #[test]
    fn test_render_post_binds_metadata_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        write_templates(dir.path(), INDEX_TEMPLATE, POST_TEMPLATE);

        let renderer = Renderer::from_config(&config).unwrap();
        let metadata = meta("<!--\ntitle: Hello World\n-->\n", "hello-world.md", &config);
        let html = renderer
            .render_post("<h1>Hello World</h1>", &metadata, &config)
            .unwrap();

        assert!(html.contains("<title>Hello World - Test Site</title>"));
        assert!(html.contains("<h1>Hello World</h1>"));
    }

    #[test]
    fn test_render_post_strips_residual_header() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        write_templates(dir.path(), INDEX_TEMPLATE, POST_TEMPLATE);

        let renderer = Renderer::from_config(&config).unwrap();
        let metadata = meta("<!--\ntitle: T\n-->\n", "t.md", &config);
        let content = "<!--\ntitle: T\n-->\n<p>body</p>";
        let html = renderer.render_post(content, &metadata, &config).unwrap();

        assert!(!html.contains("<!--"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_render_index_lists_every_post() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        write_templates(dir.path(), INDEX_TEMPLATE, POST_TEMPLATE);

        let renderer = Renderer::from_config(&config).unwrap();
        let posts: Vec<_> = ["one", "two", "three"]
            .iter()
            .map(|name| {
                meta(
                    &format!("<!--\ntitle: {name}\n-->\n"),
                    &format!("{name}.md"),
                    &config,
                )
            })
            .collect();
        let html = renderer.render_index(&posts, &config).unwrap();

        for name in ["one", "two", "three"] {
            assert!(html.contains(&format!("href=\"/{name}.html\"")));
        }
        assert_eq!(html.matches("<li>").count(), 3);
    }

    #[test]
    fn test_missing_template_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        // No template files written.

        let err = Renderer::from_config(&config).unwrap_err();
        assert!(matches!(err, TemplateError::Io(_, _)));
    }

    #[test]
    fn test_broken_template_is_compile_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        write_templates(dir.path(), "{% for x in %}", POST_TEMPLATE);

        let err = Renderer::from_config(&config).unwrap_err();
        assert!(matches!(err, TemplateError::Compile { name: "index", .. }));
    }

    #[test]
    fn test_unknown_variable_renders_empty() {
        // Nunjucks-style engines render missing lookups as empty strings
        // rather than failing; minijinja matches with default settings.
        let dir = tempfile::tempdir().unwrap();
        let config = site(dir.path());
        write_templates(dir.path(), INDEX_TEMPLATE, "<p>{{ post.metadata.missing }}</p>");

        let renderer = Renderer::from_config(&config).unwrap();
        let metadata = meta("<!--\ntitle: T\n-->\n", "t.md", &config);
        let html = renderer.render_post("", &metadata, &config).unwrap();

        assert_eq!(html, "<p></p>");
    }

    #[test]
    fn test_strip_residual_header_custom_tokens() {
        let pattern = header_pattern("+++", "+++");
        let html = "a +++\ntitle: x\n+++ b";

        assert_eq!(pattern.replace_all(html, ""), "a  b");
    }

    #[test]
    fn test_strip_removes_all_blocks() {
        let pattern = header_pattern("<!--", "-->");
        let html = "<!-- one --><p>keep</p><!-- two -->";

        assert_eq!(pattern.replace_all(html, ""), "<p>keep</p>");
    }
}
