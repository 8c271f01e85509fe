//! Reload Orchestrator
//!
//! Startup scan plus the notify-based directory watcher, driving the
//! per-file pipeline: read, compile against the cached previous unit,
//! execute, bridge, commit. Every stage catches and reports locally;
//! nothing propagates to the watcher loop, and one script's failure never
//! touches another script's state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use spadework_script::{CompileError, Diagnostic, Evaluator, render_diagnostics};

use crate::bridge::{EventBridge, SimulationReport};
use crate::cache::ScriptCache;
use crate::config::{CommitPolicy, HostConfig};
use crate::error::Result;
use crate::source;

/// Disposition of one reload cycle.
#[derive(Debug)]
pub enum ReloadReport {
    /// Source absent or empty; nothing to do this cycle.
    Skipped,
    /// Blocking diagnostics; the previous good unit stays authoritative.
    CompileFailed(usize),
    /// Compile succeeded but execution faulted.
    ExecutionFaulted,
    /// Pipeline ran to completion.
    Loaded {
        simulation: Option<SimulationReport>,
    },
}

/// Per-file gate: one in-flight reload, queue depth 1. Notifications that
/// land while a reload runs coalesce into a single follow-up run.
#[derive(Default)]
struct ReloadGate {
    running: AtomicBool,
    dirty: AtomicBool,
}

/// Directory watcher and per-file reload driver.
pub struct ReloadOrchestrator<E: Evaluator> {
    config: HostConfig,
    evaluator: Arc<E>,
    cache: Arc<ScriptCache<E::Unit>>,
    bridge: Arc<EventBridge>,
    gates: DashMap<PathBuf, Arc<ReloadGate>>,
}

impl<E: Evaluator> ReloadOrchestrator<E> {
    pub fn new(config: HostConfig, evaluator: Arc<E>, bridge: Arc<EventBridge>) -> Self {
        Self {
            config,
            evaluator,
            cache: Arc::new(ScriptCache::new()),
            bridge,
            gates: DashMap::new(),
        }
    }

    pub fn cache(&self) -> &Arc<ScriptCache<E::Unit>> {
        &self.cache
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Reload every existing script once. Returns the number of attempted
    /// cycles; each one is independently failable.
    pub async fn scan_existing(&self) -> usize {
        let dir = &self.config.scripts_dir;
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot scan script directory {}: {}", dir.display(), e);
                return 0;
            }
        };

        let mut attempted = 0;
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    if !self.matches_extension(&path) || !path.is_file() {
                        continue;
                    }
                    attempted += 1;
                    self.reload_file(&path).await;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("error scanning {}: {}", dir.display(), e);
                    break;
                }
            }
        }

        info!("startup scan attempted {} script(s)", attempted);
        attempted
    }

    /// Watch the script directory and schedule a reload per notification.
    /// Runs until the watcher channel closes or the future is dropped.
    pub async fn watch(self: Arc<Self>) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(100);
        let extension = self.config.extension.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: std::result::Result<Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            return;
                        }
                        for path in &event.paths {
                            if path.extension().and_then(|e| e.to_str())
                                == Some(extension.as_str())
                            {
                                let _ = tx.blocking_send(path.clone());
                            }
                        }
                    }
                    Err(e) => {
                        error!("file watcher error: {}", e);
                    }
                }
            })?;

        watcher.watch(&self.config.scripts_dir, RecursiveMode::NonRecursive)?;
        info!(
            "watching script directory: {}",
            self.config.scripts_dir.display()
        );

        while let Some(path) = rx.recv().await {
            self.schedule_reload(path);
        }

        Ok(())
    }

    /// Fire-and-forget a reload for `path`, coalescing bursts. If a reload
    /// for the same path is already in flight the notification only marks
    /// the gate dirty; the in-flight task drains it.
    pub fn schedule_reload(self: &Arc<Self>, path: PathBuf) {
        let gate = self
            .gates
            .entry(path.clone())
            .or_insert_with(Arc::default)
            .value()
            .clone();

        gate.dirty.store(true, Ordering::SeqCst);
        if gate
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                while gate.dirty.swap(false, Ordering::SeqCst) {
                    this.reload_file(&path).await;
                }
                gate.running.store(false, Ordering::SeqCst);
                // A notification can land between the drain and the store;
                // take the gate back if so.
                if gate.dirty.load(Ordering::SeqCst)
                    && gate
                        .running
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                {
                    continue;
                }
                break;
            }
        });
    }

    /// Run the full pipeline for one script. Never propagates an error;
    /// the report describes the disposition.
    pub async fn reload_file(&self, path: &Path) -> ReloadReport {
        info!("reloading script: {}", path.display());

        let Some(text) = source::read_script(path).await else {
            debug!("skipping {}: no source this cycle", path.display());
            return ReloadReport::Skipped;
        };

        let previous = self.cache.previous(path);
        let unit = match self.evaluator.compile(&text, previous.as_ref(), path) {
            Ok(unit) => unit,
            Err(CompileError::EmptySource) => return ReloadReport::Skipped,
            Err(CompileError::Blocked(diagnostics)) => {
                error!(
                    "script {} failed to compile:\n{}",
                    path.display(),
                    render_diagnostics(&diagnostics)
                );
                let count = diagnostics.len();
                self.cache.record_diagnostics(path, diagnostics);
                return ReloadReport::CompileFailed(count);
            }
            Err(CompileError::Engine(e)) => {
                error!("script {} failed to compile: {}", path.display(), e);
                self.cache
                    .record_diagnostics(path, vec![Diagnostic::error(e.to_string())]);
                return ReloadReport::CompileFailed(1);
            }
        };

        if self.config.commit == CommitPolicy::OnCompile {
            self.cache.commit(path, unit.clone());
        }

        let outcome = match self.evaluator.execute(&unit) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("script {} faulted: {}", path.display(), e);
                return ReloadReport::ExecutionFaulted;
            }
        };

        self.bridge.install(path, &outcome);

        let simulation = if self.config.simulate_connect {
            Some(self.bridge.simulate_connect(outcome.connection.as_ref()))
        } else {
            None
        };

        if self.config.commit == CommitPolicy::AfterExecute {
            self.cache.commit(path, unit);
        }

        ReloadReport::Loaded { simulation }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.config.extension.as_str())
    }
}
