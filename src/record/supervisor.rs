// src/record/supervisor.rs

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::launcher::{RecordingLauncher, RecordingProcess, RecordingRequest};
use super::relay::spawn_output_relay;
use super::terminate::DEFAULT_GRACE;
use crate::errors::{StartError, StopError};
use crate::sink::SharedSink;

/// Bookkeeping for one active recording.
///
/// `id` tells apart two recordings that used the same key one after the
/// other, so a stale relay never speaks for the new one.
struct RecordingEntry {
    id: u64,
    process: Box<dyn RecordingProcess>,
    relay: JoinHandle<()>,
    started_at: DateTime<Local>,
}

/// Registry slot for one key.
///
/// A key stays reserved as `Stopping` until its recorder has been
/// terminated, so a new recorder never overlaps the old one.
enum Slot {
    Active(RecordingEntry),
    Stopping { id: u64 },
}

impl Slot {
    fn active_id(&self) -> Option<u64> {
        match self {
            Slot::Active(entry) => Some(entry.id),
            Slot::Stopping { .. } => None,
        }
    }
}

type Registry = HashMap<String, Slot>;

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy)]
pub struct SupervisorOptions {
    /// How long a recorder may take to exit after the interrupt.
    pub grace: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
        }
    }
}

/// Registry of active recordings, keyed by channel target.
///
/// Every mutation happens under one lock, and the lock is never held across
/// an `.await`: stopping marks the key `Stopping`, terminates, then removes
/// the key. A key is recorded iff it is present and active.
pub struct RecordingSupervisor {
    registry: Arc<Mutex<Registry>>,
    launcher: Arc<dyn RecordingLauncher>,
    sink: SharedSink,
    options: SupervisorOptions,
    next_id: AtomicU64,
}

impl fmt::Debug for RecordingSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSupervisor")
            .field("active", &self.list_active())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl RecordingSupervisor {
    pub fn new(
        launcher: Arc<dyn RecordingLauncher>,
        sink: SharedSink,
        options: SupervisorOptions,
    ) -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
            launcher,
            sink,
            options,
            next_id: AtomicU64::new(1),
        }
    }

    /// Start recording `request.key`.
    ///
    /// Never spawns a second recorder for a key that is active or still
    /// stopping.
    pub fn start_recording(&self, request: &RecordingRequest) -> Result<String, StartError> {
        let key = request.key.as_str();
        if lock(&self.registry).contains_key(key) {
            return Err(StartError::AlreadyActive {
                key: key.to_string(),
            });
        }

        let output_dir = resolve_output_dir(request.output_dir.as_deref())?;

        let mut registry = lock(&self.registry);
        // Re-check under the lock: another watcher may have won the race.
        if registry.contains_key(key) {
            return Err(StartError::AlreadyActive {
                key: key.to_string(),
            });
        }

        let mut process = self
            .launcher
            .launch(request, &output_dir)
            .map_err(|source| StartError::SpawnError {
                key: key.to_string(),
                source,
            })?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let relay = spawn_output_relay(
            key.to_string(),
            process.take_output(),
            Arc::clone(&self.sink),
            still_active(&self.registry, key, id),
        );

        registry.insert(
            key.to_string(),
            Slot::Active(RecordingEntry {
                id,
                process,
                relay,
                started_at: Local::now(),
            }),
        );
        info!(%key, id, dir = %output_dir.display(), "recording started");

        Ok(format!("recording started: {key}"))
    }

    /// Stop the recording for `key`.
    ///
    /// The key stays reserved while the recorder terminates and is removed
    /// once termination has been attempted, even when `Terminate` is
    /// returned or this future is dropped.
    pub async fn stop_recording(&self, key: &str) -> Result<String, StopError> {
        let entry = self.begin_stop(key).ok_or_else(|| StopError::NotActive {
            key: key.to_string(),
        })?;

        let RecordingEntry {
            id,
            mut process,
            relay,
            started_at,
        } = entry;
        let _release = StoppingGuard {
            registry: Arc::clone(&self.registry),
            key: key.to_string(),
            id,
        };
        debug!(%key, id, pid = ?process.id(), %started_at, "stopping recording");

        let result = process.terminate(self.options.grace).await;
        relay.abort();

        match result {
            Ok(()) => {
                info!(%key, id, "recording stopped");
                Ok(format!("recording stopped: {key}"))
            }
            Err(source) => {
                warn!(%key, id, error = %source, "recorder did not stop cleanly");
                Err(StopError::Terminate {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    /// Stop every active recording, one after the other.
    ///
    /// Works on a snapshot of the keys; a failure on one key does not keep
    /// the others from being stopped.
    pub async fn stop_all_recordings(&self) -> Vec<(String, Result<String, StopError>)> {
        let keys = self.list_active();
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            let result = self.stop_recording(&key).await;
            if let Err(e) = &result {
                warn!(%key, error = %e, "stop-all: failed to stop recording");
            }
            results.push((key, result));
        }
        results
    }

    /// Swap an active entry for a `Stopping` marker and hand it out.
    fn begin_stop(&self, key: &str) -> Option<RecordingEntry> {
        let mut registry = lock(&self.registry);
        let id = registry.get(key)?.active_id()?;
        match registry.insert(key.to_string(), Slot::Stopping { id }) {
            Some(Slot::Active(entry)) => Some(entry),
            _ => None,
        }
    }

    pub fn is_recording(&self, key: &str) -> bool {
        lock(&self.registry)
            .get(key)
            .is_some_and(|slot| slot.active_id().is_some())
    }

    /// True while the recorder for `key` is being terminated.
    pub fn is_stopping(&self, key: &str) -> bool {
        matches!(lock(&self.registry).get(key), Some(Slot::Stopping { .. }))
    }

    pub fn list_active(&self) -> BTreeSet<String> {
        lock(&self.registry)
            .iter()
            .filter(|(_, slot)| slot.active_id().is_some())
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn options(&self) -> SupervisorOptions {
        self.options
    }
}

fn still_active(
    registry: &Arc<Mutex<Registry>>,
    key: &str,
    id: u64,
) -> impl Fn() -> bool + Send + Sync + 'static {
    let registry = Arc::downgrade(registry);
    let key = key.to_string();
    move || {
        let Some(registry) = registry.upgrade() else {
            return false;
        };
        let current = lock(&registry).get(&key).and_then(Slot::active_id);
        current == Some(id)
    }
}

/// Drops the `Stopping` marker for `key` once termination is over.
struct StoppingGuard {
    registry: Arc<Mutex<Registry>>,
    key: String,
    id: u64,
}

impl Drop for StoppingGuard {
    fn drop(&mut self) {
        let mut registry = lock(&self.registry);
        if matches!(registry.get(&self.key), Some(Slot::Stopping { id }) if *id == self.id) {
            registry.remove(&self.key);
        }
    }
}

/// Create the output directory; no directory means the working directory.
fn resolve_output_dir(dir: Option<&Path>) -> Result<PathBuf, StartError> {
    let dir = match dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => std::env::current_dir().map_err(|source| StartError::OutputDir {
            path: PathBuf::from("."),
            source,
        })?,
    };

    std::fs::create_dir_all(&dir).map_err(|source| StartError::OutputDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
