//! Launching files and URLs in the user's default application.

use anyhow::{Context, Result};
use std::process::Command;

#[cfg(target_os = "macos")]
const OPENER: &[&str] = &["open"];
#[cfg(target_os = "windows")]
const OPENER: &[&str] = &["cmd", "/C", "start", ""];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: &[&str] = &["xdg-open"];

/// Open a path or URL with the platform's default handler.
///
/// Fire-and-forget: the child process is not waited on.
pub fn open_external(target: &str) -> Result<()> {
    Command::new(OPENER[0])
        .args(&OPENER[1..])
        .arg(target)
        .spawn()
        .with_context(|| format!("Failed to open `{target}`"))?;
    Ok(())
}
