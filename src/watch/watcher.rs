// src/watch/watcher.rs

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::probe::StatusProbe;
use crate::types::{ChannelSlot, WatchState};
use crate::watch::event::{WatchEvent, WatchEventKind, WatchListener};
use crate::watch::state::ChannelWatch;

/// Handle for one running channel watcher.
///
/// Dropping the handle does not stop the watcher; call [`WatcherHandle::stop`].
pub struct WatcherHandle {
    slot: ChannelSlot,
    target: String,
    token: CancellationToken,
    state_rx: tokio::sync::watch::Receiver<WatchState>,
    join: JoinHandle<()>,
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("slot", &self.slot)
            .field("target", &self.target)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    pub fn slot(&self) -> ChannelSlot {
        self.slot
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Latest state published by the watcher loop.
    pub fn state(&self) -> WatchState {
        *self.state_rx.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Ask the loop to exit at its next cycle boundary.
    pub fn request_stop(&self) {
        self.token.cancel();
    }

    /// Request a stop and wait for teardown.
    ///
    /// An in-flight probe is allowed to finish first.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.join.await {
            warn!(slot = self.slot.get(), target = %self.target, error = %e, "watcher task ended abnormally");
        }
    }
}

/// Start polling the channel named by `input`.
///
/// Fails with `InvalidTarget` when `input` does not resolve; nothing is
/// spawned in that case.
pub fn spawn_watcher(
    mut watch: ChannelWatch,
    input: &str,
    probe: Arc<dyn StatusProbe>,
    listener: Arc<dyn WatchListener>,
) -> Result<WatcherHandle> {
    let target = watch.begin(input)?.to_string();
    let slot = watch.slot();
    let token = CancellationToken::new();
    let (state_tx, state_rx) = tokio::sync::watch::channel(watch.state());

    info!(slot = slot.get(), %target, period = ?watch.period(), "starting channel watcher");

    let join = tokio::spawn(run_watch_loop(
        watch,
        probe,
        listener,
        token.clone(),
        state_tx,
    ));

    Ok(WatcherHandle {
        slot,
        target,
        token,
        state_rx,
        join,
    })
}

async fn run_watch_loop(
    mut watch: ChannelWatch,
    probe: Arc<dyn StatusProbe>,
    listener: Arc<dyn WatchListener>,
    token: CancellationToken,
    state_tx: tokio::sync::watch::Sender<WatchState>,
) {
    let slot = watch.slot();
    let target = watch.target().unwrap_or_default().to_string();
    let emit = |kind: WatchEventKind, at| WatchEvent {
        slot,
        target: target.clone(),
        at,
        kind,
    };

    listener.on_event(&emit(WatchEventKind::Started, Local::now())).await;

    while !token.is_cancelled() {
        let status = probe.check(&target).await;
        let kind = watch.observe(&status);
        state_tx.send_replace(watch.state());

        if kind.is_edge() {
            info!(slot = slot.get(), %target, ?kind, "liveness edge");
        } else {
            debug!(slot = slot.get(), %target, ?kind, "poll cycle complete");
        }
        listener.on_event(&emit(kind, status.checked_at)).await;

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(watch.period()) => {}
        }
    }

    watch.end();
    state_tx.send_replace(watch.state());
    info!(slot = slot.get(), %target, "channel watcher stopped");
    listener.on_event(&emit(WatchEventKind::Stopped, Local::now())).await;
}
