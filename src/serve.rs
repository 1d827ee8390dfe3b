//! Development server.
//!
//! A lightweight HTTP server over the build output directory, built on
//! `tiny_http`:
//!
//! - Static file serving with a MIME table
//! - Automatic `index.html` resolution for directories
//! - Live-reload script injection into served HTML pages
//! - Graceful shutdown on Ctrl+C
//!
//! The file watcher and the reload hub are wired up by the `run` command;
//! this module only answers HTTP requests.

use crate::{config::SiteConfig, log, reload::ReloadHub};
use anyhow::{Context, Result};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::Path,
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use.
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server entry point
// ============================================================================

/// Start the development server. Blocks until Ctrl+C.
pub fn serve_site(
    config: &SiteConfig,
    interface: IpAddr,
    port: u16,
    reload: &ReloadHub,
    open: bool,
) -> Result<()> {
    let (server, addr) = try_bind_port(interface, port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{addr}");
    if open {
        crate::utils::open::open_external(&format!("http://{addr}"))?;
    }

    let output = config.output_dir();
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &output, reload.port()) {
            log!("serve"; "request error: {e:#}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request handling
// ============================================================================

/// Handle a single HTTP request.
///
/// Resolution order: exact file → directory `index.html` → 404.
fn handle_request(request: Request, serve_root: &Path, reload_port: u16) -> Result<()> {
    // Decode URL-encoded characters and strip any query string.
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/');
    let local_path = serve_root.join(request_path);

    if local_path.is_file() {
        return serve_file(request, &local_path, reload_port);
    }

    if local_path.is_dir() {
        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return serve_file(request, &index_path, reload_port);
        }
    }

    serve_not_found(request)
}

/// Serve a file with appropriate content type.
///
/// HTML pages get the live-reload script injected on the way out.
fn serve_file(request: Request, path: &Path, reload_port: u16) -> Result<()> {
    let content_type = guess_content_type(path);
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let content = if content_type.starts_with("text/html") {
        let html = String::from_utf8_lossy(&content);
        inject_reload_script(&html, reload_port).into_bytes()
    } else {
        content
    };

    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::new(
        StatusCode(404),
        vec![Header::from_bytes("Content-Type", "text/plain").unwrap()],
        std::io::Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Live reload injection
// ============================================================================

/// Append the reload WebSocket client to an HTML page.
///
/// Inserted before `</body>` when present, appended otherwise.
fn inject_reload_script(html: &str, reload_port: u16) -> String {
    let script = format!(
        "<script>new WebSocket(`ws://${{location.hostname}}:{reload_port}`).onmessage = \
         (e) => {{ if (e.data === \"reload\") location.reload(); }};</script>"
    );

    match html.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + script.len());
            out.push_str(&html[..pos]);
            out.push_str(&script);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}{script}"),
    }
}

// ============================================================================
// Content type detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(
            guess_content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("css/main.css")),
            "text/css; charset=utf-8"
        );
        assert_eq!(guess_content_type(Path::new("logo.png")), "image/png");
        assert_eq!(
            guess_content_type(Path::new("unknown.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            guess_content_type(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_inject_before_closing_body() {
        let html = "<html><body><p>hi</p></body></html>";
        let out = inject_reload_script(html, 35730);

        assert!(out.contains("new WebSocket"));
        assert!(out.contains(":35730"));
        let script_pos = out.find("<script>").unwrap();
        let body_pos = out.find("</body>").unwrap();
        assert!(script_pos < body_pos);
    }

    #[test]
    fn test_inject_appends_without_body_tag() {
        let html = "<p>fragment</p>";
        let out = inject_reload_script(html, 35730);

        assert!(out.starts_with("<p>fragment</p>"));
        assert!(out.ends_with("</script>"));
    }
}
