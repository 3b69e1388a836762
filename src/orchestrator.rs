// src/orchestrator.rs

//! Headless orchestrator.
//!
//! Owns the fixed channel slots, starts and stops their watchers, and wires
//! watcher edges to the recording supervisor through [`RecordingBridge`]:
//! - live edge → start a recording (only with `auto_record`)
//! - offline edge → stop the channel's recording if there is one
//! - watcher stopped → same as offline

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::{Result, StopError};
use crate::probe::StatusProbe;
use crate::probe::ytdlp::PROBE_TIMEOUT;
use crate::record::{RecordingRequest, RecordingSupervisor};
use crate::sink::SharedSink;
use crate::types::ChannelSlot;
use crate::watch::{
    ChannelWatch, WatchEvent, WatchEventKind, WatchListener, WatcherHandle, spawn_watcher,
};

/// Recording-related settings handed over by whoever drives the core.
#[derive(Debug, Clone)]
pub struct RecordSettings {
    pub auto_record: bool,
    pub ytdlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub save_path: Option<PathBuf>,
}

/// Watch listener that reports every event and drives the supervisor.
pub struct RecordingBridge {
    supervisor: Arc<RecordingSupervisor>,
    settings: RecordSettings,
    sink: SharedSink,
}

impl RecordingBridge {
    pub fn new(
        supervisor: Arc<RecordingSupervisor>,
        settings: RecordSettings,
        sink: SharedSink,
    ) -> Self {
        Self {
            supervisor,
            settings,
            sink,
        }
    }

    pub fn supervisor(&self) -> &Arc<RecordingSupervisor> {
        &self.supervisor
    }

    /// Start recording `target` on behalf of `slot`, reporting the outcome.
    ///
    /// Directory creation and the spawn run on the blocking pool.
    pub async fn start_recording(&self, slot: ChannelSlot, target: &str) {
        let request = RecordingRequest {
            key: target.to_string(),
            ytdlp: self.settings.ytdlp.clone(),
            ffmpeg: self.settings.ffmpeg.clone(),
            output_dir: self.settings.save_path.clone(),
        };
        let supervisor = Arc::clone(&self.supervisor);
        let started =
            tokio::task::spawn_blocking(move || supervisor.start_recording(&request)).await;

        match started {
            Ok(Ok(msg)) => self.sink.line(None, &format!("[{slot}] {msg}")),
            Ok(Err(e)) => {
                warn!(slot = slot.get(), %target, error = %e, "could not start recording");
                self.sink.line(None, &format!("[{slot}] cannot start recording: {e}"));
            }
            Err(e) => {
                warn!(slot = slot.get(), %target, error = %e, "start task failed");
                self.sink.line(None, &format!("[{slot}] cannot start recording: {e}"));
            }
        }
    }

    /// Stop the recording of `target` if one is running.
    pub async fn stop_recording(&self, slot: ChannelSlot, target: &str) {
        if !self.supervisor.is_recording(target) {
            return;
        }
        match self.supervisor.stop_recording(target).await {
            Ok(msg) => self.sink.line(None, &format!("[{slot}] {msg}")),
            // Lost a race with another stop; nothing left to do.
            Err(StopError::NotActive { .. }) => {
                debug!(slot = slot.get(), %target, "recording already stopped");
            }
            Err(e) => self.sink.line(None, &format!("[{slot}] {e}")),
        }
    }

    async fn handle(&self, event: &WatchEvent) {
        self.sink.line(None, &event.to_string());

        match &event.kind {
            WatchEventKind::WentLive { .. } if self.settings.auto_record => {
                self.start_recording(event.slot, &event.target).await;
            }
            WatchEventKind::WentOffline | WatchEventKind::Stopped => {
                self.stop_recording(event.slot, &event.target).await;
            }
            _ => {}
        }
    }
}

impl WatchListener for RecordingBridge {
    fn on_event<'a>(
        &'a self,
        event: &'a WatchEvent,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.handle(event))
    }
}

/// The channel slots and their watchers.
pub struct Orchestrator {
    bridge: Arc<RecordingBridge>,
    probe: Arc<dyn StatusProbe>,
    sink: SharedSink,
    period: Duration,
    inputs: BTreeMap<ChannelSlot, String>,
    watchers: BTreeMap<ChannelSlot, WatcherHandle>,
}

impl Orchestrator {
    pub fn new(
        bridge: Arc<RecordingBridge>,
        probe: Arc<dyn StatusProbe>,
        sink: SharedSink,
        period: Duration,
    ) -> Self {
        Self {
            bridge,
            probe,
            sink,
            period,
            inputs: BTreeMap::new(),
            watchers: BTreeMap::new(),
        }
    }

    pub fn supervisor(&self) -> &Arc<RecordingSupervisor> {
        self.bridge.supervisor()
    }

    /// Set the URL or identifier a slot will watch on its next start.
    pub fn set_channel(&mut self, slot: ChannelSlot, input: impl Into<String>) {
        self.inputs.insert(slot, input.into());
    }

    pub fn is_monitoring(&self, slot: ChannelSlot) -> bool {
        self.watchers.get(&slot).is_some_and(|w| !w.is_finished())
    }

    pub fn watcher(&self, slot: ChannelSlot) -> Option<&WatcherHandle> {
        self.watchers.get(&slot)
    }

    /// Start watching the input set for `slot`.
    ///
    /// A slot that is already running is left alone. `InvalidTarget` is
    /// reported on the sink and returned.
    pub fn start_channel(&mut self, slot: ChannelSlot) -> Result<()> {
        if self.is_monitoring(slot) {
            debug!(slot = slot.get(), "channel already monitored");
            return Ok(());
        }

        let input = self.inputs.get(&slot).map(String::as_str).unwrap_or_default();
        let watch = ChannelWatch::new(slot, self.period);
        let listener: Arc<dyn WatchListener> = self.bridge.clone();

        match spawn_watcher(watch, input, Arc::clone(&self.probe), listener) {
            Ok(handle) => {
                self.watchers.insert(slot, handle);
                Ok(())
            }
            Err(e) => {
                warn!(slot = slot.get(), %input, error = %e, "not starting watcher");
                self.sink.line(None, &format!("[{slot}] {e}"));
                Err(e)
            }
        }
    }

    /// Stop the watcher of `slot` and wait for its teardown.
    pub async fn stop_channel(&mut self, slot: ChannelSlot) -> bool {
        match self.watchers.remove(&slot) {
            Some(handle) => {
                handle.stop().await;
                true
            }
            None => false,
        }
    }

    /// Start every idle slot that has a non-empty input.
    ///
    /// Returns how many watchers are running afterwards.
    pub fn start_all(&mut self) -> usize {
        let slots: Vec<ChannelSlot> = self
            .inputs
            .iter()
            .filter(|(_, input)| !input.trim().is_empty())
            .map(|(slot, _)| *slot)
            .collect();

        for slot in slots {
            // Failures are already reported; the other slots still start.
            let _ = self.start_channel(slot);
        }
        ChannelSlot::all().filter(|s| self.is_monitoring(*s)).count()
    }

    pub async fn stop_all(&mut self) {
        let handles = std::mem::take(&mut self.watchers);
        for handle in handles.values() {
            handle.request_stop();
        }
        for (_, handle) in handles {
            handle.stop().await;
        }
    }

    /// Stop watchers and every recording.
    ///
    /// Recordings are stopped right away; watchers get a bounded time to
    /// finish an in-flight probe.
    pub async fn shutdown(&mut self) {
        info!("shutting down");
        let handles = std::mem::take(&mut self.watchers);
        for handle in handles.values() {
            handle.request_stop();
        }

        for (key, result) in self.supervisor().stop_all_recordings().await {
            match result {
                Ok(msg) => self.sink.line(None, &msg),
                Err(e) => self.sink.line(None, &format!("{key}: {e}")),
            }
        }

        let wait = PROBE_TIMEOUT + self.supervisor().options().grace;
        let joined = tokio::time::timeout(wait, async {
            for (_, handle) in handles {
                handle.stop().await;
            }
        })
        .await;
        if joined.is_err() {
            warn!("watchers did not finish within {wait:?}; abandoning them");
        }
    }
}
