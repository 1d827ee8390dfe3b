//! File system watcher for live rebuild.
//!
//! Monitors the site's `src/` tree and the manifest for changes, coalesces
//! event bursts, and triggers full rebuilds followed by a live-reload
//! broadcast.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       Event Loop                              │
//! │                                                               │
//! │  ┌──────────┐    ┌──────────┐    ┌──────────────┐             │
//! │  │ notify   │───▶│ Debouncer│───▶│ RebuildQueue │             │
//! │  │ events   │    │ (300ms)  │    │ (one slot)   │             │
//! │  └──────────┘    └──────────┘    └──────┬───────┘             │
//! │                                         │                     │
//! │                              ┌──────────▼──────────┐          │
//! │                              │   Builder Thread    │          │
//! │                              │ build → broadcast   │          │
//! │                              └─────────────────────┘          │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rebuilds are strictly serialized: the builder thread runs one build at
//! a time, and any number of triggers arriving during a build collapse
//! into a single queued follow-up. That follow-up always runs against the
//! latest files on disk, so the most recent state is eventually reflected.

use crate::{build::build_site, config::SiteConfig, log, reload::ReloadHub};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread,
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;

// =============================================================================
// Path utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

// =============================================================================
// Debounce state
// =============================================================================

/// Batches rapid file events so one save burst becomes one trigger.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add_paths(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Rebuild coalescing
// =============================================================================

/// Single-slot rebuild scheduling.
///
/// One build may be in flight and at most one more may be queued behind
/// it. Triggers arriving while both hold are dropped; the queued build
/// picks up the latest on-disk state anyway. Invariant: `pending` is never
/// set while `building` is clear.
#[derive(Default)]
struct RebuildQueue {
    building: bool,
    pending: bool,
}

impl RebuildQueue {
    /// Record a rebuild request. Returns true when the caller should start
    /// a build now; false means the request was absorbed into the pending
    /// slot.
    fn trigger(&mut self) -> bool {
        if self.building {
            self.pending = true;
            false
        } else {
            self.building = true;
            true
        }
    }

    /// Record build completion. Returns true when a follow-up build should
    /// run immediately (the queue stays in the building state).
    fn finished(&mut self) -> bool {
        if self.pending {
            self.pending = false;
            true
        } else {
            self.building = false;
            false
        }
    }
}

// =============================================================================
// Watcher setup
// =============================================================================

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    let source_dir = config.root().join("src");
    watcher
        .watch(&source_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", source_dir.display()))?;

    let manifest = config.manifest_path();
    if manifest.exists() {
        watcher
            .watch(&manifest, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", manifest.display()))?;
    }

    log!("watch"; "watching {} and {}", source_dir.display(), manifest.display());
    Ok(())
}

// =============================================================================
// Public API
// =============================================================================

/// Start the blocking file watcher with debouncing and live rebuild.
///
/// Build failures are logged and the watcher stays alive so the user can
/// fix the source and trigger another rebuild.
pub fn watch_for_changes_blocking(config: &'static SiteConfig, reload: ReloadHub) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, config)?;

    let queue = Arc::new(Mutex::new(RebuildQueue::default()));
    let (build_tx, build_rx) = mpsc::channel::<()>();

    // Builder thread: serializes rebuilds and drains the pending slot.
    let builder_queue = Arc::clone(&queue);
    thread::spawn(move || {
        while build_rx.recv().is_ok() {
            loop {
                match build_site(config) {
                    Ok(()) => reload.broadcast(),
                    Err(err) => log!("error"; "rebuild failed: {err:#}"),
                }
                if !builder_queue.lock().finished() {
                    break;
                }
            }
        }
    });

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => {
                debouncer.add_paths(event.paths);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                let changed = debouncer.take();
                log!("watch"; "{} path(s) changed, rebuilding...", changed.len());
                if queue.lock().trigger() && build_tx.send(()).is_err() {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
            // Irrelevant events, timeouts without pending work.
            _ => {}
        }
    }

    Ok(())
}
