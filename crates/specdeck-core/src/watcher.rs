//! Debounced file watching over the `.specify/` tree and the per-assistant
//! command directories.
//!
//! A [`ProjectWatcher`] moves through
//! `Uninitialized -> AwaitingRoot -> Watching -> Disposed`. While the
//! workspace has no `.specify/` it only watches the workspace root itself;
//! once `.specify/` appears it adds a recursive watch on it and emits a
//! synthetic `created` event for it. Raw events are filtered through the
//! ignore list, coalesced per relative path (last kind wins) and delivered as
//! one batch when the debounce window elapses without new events.
//!
//! The watcher never touches any cache. Consumers subscribe to batches and
//! decide what to invalidate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::classifier::classify;
use crate::config::WatchSettings;
use crate::error::{Result, SpecdeckError};
use crate::glob::IgnoreList;
use crate::paths::{self, AGENT_COMMAND_DIRS, SPECIFY_DIR};
use crate::types::{ChangeKind, FileChangeEvent};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

const BATCH_CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// WatchState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    Uninitialized,
    /// Watching the workspace root for `.specify/` to appear.
    AwaitingRoot,
    Watching,
    /// Terminal.
    Disposed,
}

impl std::fmt::Display for WatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WatchState::Uninitialized => "uninitialized",
            WatchState::AwaitingRoot => "awaiting_root",
            WatchState::Watching => "watching",
            WatchState::Disposed => "disposed",
        };
        f.write_str(s)
    }
}

type SharedState = Arc<Mutex<WatchState>>;

fn read_state(state: &SharedState) -> WatchState {
    *state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Store `next`, returning the previous state. `Disposed` is never left.
fn write_state(state: &SharedState, next: WatchState) -> WatchState {
    let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());
    if *guard == WatchState::Disposed {
        return WatchState::Disposed;
    }
    std::mem::replace(&mut *guard, next)
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

/// Pending events keyed by relative path, with a deadline re-armed on every
/// push.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: HashMap<String, FileChangeEvent>,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
            deadline: None,
        }
    }

    pub fn push(&mut self, event: FileChangeEvent, now: Instant) {
        self.pending.insert(event.relative_path.clone(), event);
        self.deadline = Some(now + self.window);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Take the batch, sorted by relative path, and disarm the timer.
    pub fn flush(&mut self) -> Vec<FileChangeEvent> {
        self.deadline = None;
        let mut batch: Vec<FileChangeEvent> = self.pending.drain().map(|(_, ev)| ev).collect();
        batch.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        batch
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadline = None;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Raw event translation
// ---------------------------------------------------------------------------

/// Map one backend event to change kinds per path. Access events and
/// backend-specific `Other` events carry no change and map to nothing.
pub fn translate(event: &Event) -> Vec<(ChangeKind, PathBuf)> {
    let all = |kind: ChangeKind| -> Vec<(ChangeKind, PathBuf)> {
        event.paths.iter().map(|p| (kind, p.clone())).collect()
    };
    match &event.kind {
        EventKind::Create(_) => all(ChangeKind::Created),
        EventKind::Remove(_) => all(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(ChangeKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(ChangeKind::Created),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event
            .paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let kind = if i == 0 {
                    ChangeKind::Deleted
                } else {
                    ChangeKind::Created
                };
                (kind, p.clone())
            })
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                let kind = if p.exists() {
                    ChangeKind::Created
                } else {
                    ChangeKind::Deleted
                };
                (kind, p.clone())
            })
            .collect(),
        EventKind::Modify(_) | EventKind::Any => all(ChangeKind::Changed),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

/// Whether a relative path belongs to the watched subtrees.
fn in_scope(relative_path: &str) -> bool {
    under(relative_path, SPECIFY_DIR) || AGENT_COMMAND_DIRS.iter().any(|d| under(relative_path, d))
}

/// Whether a change at this path can alter which directories need watches.
fn is_anchor(relative_path: &str) -> bool {
    relative_path == SPECIFY_DIR
        || AGENT_COMMAND_DIRS.iter().any(|d| {
            *d == relative_path
                || d.strip_prefix(relative_path)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
}

fn under(path: &str, dir: &str) -> bool {
    path == dir
        || path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// The subset of a filesystem watcher the loop needs.
pub trait WatchBackend: Send + 'static {
    fn watch(&mut self, path: &Path, recursive: bool) -> Result<()>;
    fn unwatch(&mut self, path: &Path) -> Result<()>;
}

impl WatchBackend for RecommendedWatcher {
    fn watch(&mut self, path: &Path, recursive: bool) -> Result<()> {
        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        Watcher::watch(self, path, mode)?;
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> Result<()> {
        Watcher::unwatch(self, path)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WatcherConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce: Duration,
    pub ignore: IgnoreList,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            ignore: IgnoreList::default(),
        }
    }
}

impl WatcherConfig {
    pub fn from_settings(settings: &WatchSettings) -> Self {
        Self {
            debounce: settings.debounce(),
            ignore: IgnoreList::new(&settings.ignore),
        }
    }
}

// ---------------------------------------------------------------------------
// WatchLoop
// ---------------------------------------------------------------------------

type Target = (PathBuf, bool);

struct WatchLoop<B: WatchBackend> {
    root: PathBuf,
    backend: B,
    watched: Vec<Target>,
    ignore: IgnoreList,
    debouncer: Debouncer,
    state: SharedState,
    batches: broadcast::Sender<Vec<FileChangeEvent>>,
}

impl<B: WatchBackend> WatchLoop<B> {
    fn new(
        root: PathBuf,
        backend: B,
        config: WatcherConfig,
        state: SharedState,
        batches: broadcast::Sender<Vec<FileChangeEvent>>,
    ) -> Self {
        Self {
            root,
            backend,
            watched: Vec::new(),
            ignore: config.ignore,
            debouncer: Debouncer::new(config.debounce),
            state,
            batches,
        }
    }

    /// Directories that should be watched given what exists right now.
    fn desired(&self) -> (WatchState, Vec<Target>) {
        let mut targets: Vec<Target> = vec![(self.root.clone(), false)];

        let specify = paths::specify_dir(&self.root);
        let state = if specify.is_dir() {
            targets.push((specify, true));
            WatchState::Watching
        } else {
            WatchState::AwaitingRoot
        };

        for dir in AGENT_COMMAND_DIRS {
            let full = self.root.join(dir);
            let target = if full.is_dir() {
                Some((full, true))
            } else {
                full.parent()
                    .filter(|p| *p != self.root.as_path() && p.is_dir())
                    .map(|p| (p.to_path_buf(), false))
            };
            if let Some(t) = target {
                if !targets.contains(&t) {
                    targets.push(t);
                }
            }
        }
        (state, targets)
    }

    /// Bring registrations in line with [`Self::desired`] and update the
    /// state. Moving from `AwaitingRoot` to `Watching` emits a synthetic
    /// `created` event for `.specify`.
    fn reconcile(&mut self) -> Result<()> {
        let (next, desired) = self.desired();

        let stale: Vec<Target> = self
            .watched
            .iter()
            .filter(|t| !desired.contains(t))
            .cloned()
            .collect();
        for target in stale {
            if let Err(e) = self.backend.unwatch(&target.0) {
                tracing::debug!(path = %target.0.display(), error = %e, "unwatch failed");
            }
            self.watched.retain(|t| *t != target);
        }

        for target in desired {
            if self.watched.contains(&target) {
                continue;
            }
            self.backend.watch(&target.0, target.1)?;
            tracing::debug!(path = %target.0.display(), recursive = target.1, "watching");
            self.watched.push(target);
        }

        let previous = write_state(&self.state, next);
        match (previous, next) {
            (WatchState::Uninitialized, WatchState::Watching) => {
                tracing::info!(root = %self.root.display(), "watching project files");
            }
            (WatchState::AwaitingRoot, WatchState::Watching) => {
                tracing::info!(root = %self.root.display(), "{SPECIFY_DIR} created; watching project files");
                let path = paths::specify_dir(&self.root);
                let created = self.event(ChangeKind::Created, path, SPECIFY_DIR.to_string());
                self.debouncer.push(created, Instant::now());
            }
            (WatchState::Watching, WatchState::AwaitingRoot) => {
                tracing::info!(root = %self.root.display(), "{SPECIFY_DIR} removed; waiting for it to reappear");
            }
            _ => {}
        }
        Ok(())
    }

    fn event(&self, kind: ChangeKind, path: PathBuf, relative_path: String) -> FileChangeEvent {
        let role = classify(&relative_path);
        FileChangeEvent {
            kind,
            path,
            relative_path,
            role,
        }
    }

    fn handle(&mut self, event: Event) {
        let now = Instant::now();
        let mut structure_changed = false;

        for (kind, path) in translate(&event) {
            let Some(rel) = paths::relative_to(&self.root, &path) else {
                continue;
            };
            if rel.is_empty() || self.ignore.is_match(&rel) {
                continue;
            }
            if kind != ChangeKind::Changed && is_anchor(&rel) {
                structure_changed = true;
            }
            if in_scope(&rel) {
                let ev = self.event(kind, path, rel);
                self.debouncer.push(ev, now);
            }
        }

        if structure_changed {
            if let Err(e) = self.reconcile() {
                tracing::warn!(error = %e, "failed to update file watches");
            }
        }
    }

    fn flush(&mut self) {
        let batch = self.debouncer.flush();
        if batch.is_empty() {
            return;
        }
        tracing::debug!(count = batch.len(), "file change batch");
        // No subscribers is not an error.
        let _ = self.batches.send(batch);
    }

    async fn run(mut self, mut raw: mpsc::UnboundedReceiver<notify::Result<Event>>) {
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                msg = raw.recv() => match msg {
                    Some(Ok(event)) => self.handle(event),
                    Some(Err(e)) => tracing::warn!(error = %e, "file watcher error"),
                    None => break,
                },
                _ = sleep_until(deadline) => self.flush(),
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending::<()>().await,
    }
}

// ---------------------------------------------------------------------------
// ProjectWatcher
// ---------------------------------------------------------------------------

pub struct ProjectWatcher {
    root: Option<PathBuf>,
    config: WatcherConfig,
    state: SharedState,
    batches: broadcast::Sender<Vec<FileChangeEvent>>,
    task: Option<JoinHandle<()>>,
}

impl ProjectWatcher {
    pub fn new(root: Option<PathBuf>, config: WatcherConfig) -> Self {
        let (batches, _) = broadcast::channel(BATCH_CHANNEL_CAPACITY);
        Self {
            root,
            config,
            state: Arc::new(Mutex::new(WatchState::Uninitialized)),
            batches,
            task: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<FileChangeEvent>> {
        self.batches.subscribe()
    }

    pub fn state(&self) -> WatchState {
        read_state(&self.state)
    }

    /// Register watches and spawn the event loop on the current tokio
    /// runtime. A no-op when already started or when there is no workspace
    /// root.
    pub fn start(&mut self) -> Result<()> {
        if self.state() == WatchState::Disposed {
            return Err(SpecdeckError::WatcherDisposed);
        }
        if self.task.is_some() {
            return Ok(());
        }
        let Some(root) = self.root.clone() else {
            tracing::info!("no workspace root; file watcher idle");
            return Ok(());
        };

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let backend = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = raw_tx.send(res);
        })?;
        self.spawn_loop(root, backend, raw_rx)
    }

    fn spawn_loop<B: WatchBackend>(
        &mut self,
        root: PathBuf,
        backend: B,
        raw: mpsc::UnboundedReceiver<notify::Result<Event>>,
    ) -> Result<()> {
        let mut core = WatchLoop::new(
            root,
            backend,
            self.config.clone(),
            self.state.clone(),
            self.batches.clone(),
        );
        if let Err(e) = core.reconcile() {
            write_state(&self.state, WatchState::Uninitialized);
            return Err(e);
        }
        self.task = Some(tokio::spawn(core.run(raw)));
        Ok(())
    }

    /// Tear down every watch and pending batch, then start again.
    pub fn restart(&mut self) -> Result<()> {
        if self.state() == WatchState::Disposed {
            return Err(SpecdeckError::WatcherDisposed);
        }
        self.stop();
        write_state(&self.state, WatchState::Uninitialized);
        self.start()
    }

    /// Stop watching for good. Idempotent.
    pub fn dispose(&mut self) {
        self.stop();
        write_state(&self.state, WatchState::Disposed);
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProjectWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
