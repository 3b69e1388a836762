// src/watch/state.rs

//! Pure per-channel state machine.
//!
//! `ChannelWatch` holds everything a watcher knows about its channel and
//! turns each probe result into a [`WatchEventKind`]. It does no IO, so the
//! edge rules can be tested without Tokio, processes or timers.
//!
//! Edge detection consults `was_live` and nothing else. Probe failures leave
//! it untouched, so an error between two live results fires nothing.

use std::time::Duration;

use crate::errors::Result;
use crate::probe::{LiveStatus, ProbeVerdict};
use crate::types::{ChannelSlot, WatchState};
use crate::watch::event::WatchEventKind;
use crate::watch::target::resolve_target;

#[derive(Debug, Clone)]
pub struct ChannelWatch {
    slot: ChannelSlot,
    target: Option<String>,
    state: WatchState,
    was_live: bool,
    period: Duration,
}

impl ChannelWatch {
    pub fn new(slot: ChannelSlot, period: Duration) -> Self {
        Self {
            slot,
            target: None,
            state: WatchState::Idle,
            was_live: false,
            period,
        }
    }

    /// Resolve `input` and enter `Polling`.
    ///
    /// On `InvalidTarget` the watch stays `Idle`.
    pub fn begin(&mut self, input: &str) -> Result<&str> {
        let target = resolve_target(input)?;
        self.state = WatchState::Polling;
        self.was_live = false;
        Ok(self.target.insert(target))
    }

    /// Fold one probe result into the state; returns what it meant.
    pub fn observe(&mut self, status: &LiveStatus) -> WatchEventKind {
        match status.verdict() {
            ProbeVerdict::Transient(err) => {
                self.state = WatchState::Failed;
                WatchEventKind::ProbeFailed(err)
            }
            ProbeVerdict::Live { title } => {
                self.state = WatchState::ObservedLive;
                if self.was_live {
                    WatchEventKind::StillLive
                } else {
                    self.was_live = true;
                    WatchEventKind::WentLive { title }
                }
            }
            ProbeVerdict::Offline => {
                self.state = WatchState::ObservedOffline;
                if self.was_live {
                    self.was_live = false;
                    WatchEventKind::WentOffline
                } else {
                    WatchEventKind::StillOffline
                }
            }
        }
    }

    /// Back to `Idle`; the target is cleared and returned.
    pub fn end(&mut self) -> Option<String> {
        self.state = WatchState::Idle;
        self.was_live = false;
        self.target.take()
    }

    pub fn slot(&self) -> ChannelSlot {
        self.slot
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn was_live(&self) -> bool {
        self.was_live
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
