//! Cadence - a static blog generator for Markdown posts.

mod build;
mod cli;
mod config;
mod init;
mod logger;
mod markdown;
mod meta;
mod reload;
mod render;
mod serve;
mod utils;
mod watch;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use init::{config_wizard, init_site, new_file};
use reload::ReloadHub;
use serve::serve_site;
use std::{
    net::IpAddr,
    path::{Path, PathBuf},
    thread,
};
use watch::watch_for_changes_blocking;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => {
            let root = site_root(path);
            init_site(&root)?;
            config_wizard(&root)
        }
        Commands::Config { path } => config_wizard(&site_root(path)),
        Commands::New { kind, title, open } => {
            let config = load_config(&site_root(None))?;
            new_file(&config, kind, &title, open)
        }
        Commands::Build { path } => {
            let config = load_config(&site_root(path))?;
            build_site(&config)
        }
        Commands::Run { path, port, open } => run_site(&site_root(path), port, open),
    }
}

fn site_root(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from("."))
}

/// Load and validate the manifest. Fails before any build I/O.
fn load_config(root: &Path) -> Result<SiteConfig> {
    let config = SiteConfig::from_root(root)?;
    config.validate()?;
    Ok(config)
}

/// Build once, then serve with file watching and live reload.
fn run_site(root: &Path, port: u16, open: bool) -> Result<()> {
    // The watcher and builder threads outlive this scope; give the config
    // a static lifetime instead of sharing a refcount everywhere.
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(root)?));

    build_site(config)?;

    let interface: IpAddr = "127.0.0.1".parse()?;
    let reload = ReloadHub::start(interface, 0)?;

    let watch_reload = reload.clone();
    thread::spawn(move || {
        if let Err(err) = watch_for_changes_blocking(config, watch_reload) {
            log!("watch"; "{err:#}");
        }
    });

    serve_site(config, interface, port, &reload, open)
}
