// src/watch/event.rs

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Local};

use crate::types::ChannelSlot;

/// What a watcher observed or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEventKind {
    /// The watcher entered its poll loop.
    Started,
    /// Offline → live edge. Fired once per transition.
    WentLive { title: Option<String> },
    StillLive,
    /// Live → offline edge. Fired once per transition.
    WentOffline,
    StillOffline,
    /// Probe gave no usable answer; liveness unchanged.
    ProbeFailed(String),
    /// The watcher left its poll loop and is idle again.
    Stopped,
}

impl WatchEventKind {
    pub fn is_edge(&self) -> bool {
        matches!(self, Self::WentLive { .. } | Self::WentOffline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub slot: ChannelSlot,
    pub target: String,
    pub at: DateTime<Local>,
    pub kind: WatchEventKind,
}

impl fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.at.format("%H:%M:%S");
        let (slot, target) = (self.slot, &self.target);
        match &self.kind {
            WatchEventKind::Started => write!(f, "[{at}] [{slot}] {target}: monitoring started"),
            WatchEventKind::WentLive { title: Some(title) } => {
                write!(f, "[{at}] [{slot}] {target} went live: {title}")
            }
            WatchEventKind::WentLive { title: None } => {
                write!(f, "[{at}] [{slot}] {target} went live")
            }
            WatchEventKind::StillLive => write!(f, "[{at}] [{slot}] {target}: live"),
            WatchEventKind::WentOffline => write!(f, "[{at}] [{slot}] {target} went offline"),
            WatchEventKind::StillOffline => write!(f, "[{at}] [{slot}] {target}: waiting"),
            WatchEventKind::ProbeFailed(err) => {
                write!(f, "[{at}] [{slot}] {target}: probe failed: {err}")
            }
            WatchEventKind::Stopped => write!(f, "[{at}] [{slot}] {target}: monitoring stopped"),
        }
    }
}

/// Receiver of watcher events.
///
/// Called inline from the watcher's task, so a slow listener delays only
/// that channel's next cycle.
pub trait WatchListener: Send + Sync {
    fn on_event<'a>(&'a self, event: &'a WatchEvent)
    -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}
