// src/watch/mod.rs

//! Channel watching and liveness edge detection.
//!
//! - [`target`] resolves user input into a channel identifier.
//! - [`state`] is the pure per-channel state machine (`ChannelWatch`).
//! - [`watcher`] runs one poll loop per channel on Tokio.
//! - [`event`] defines what watchers report and who they report to.
//!
//! It does **not** know about recordings; the orchestrator turns edges into
//! recorder calls.

pub mod event;
pub mod state;
pub mod target;
pub mod watcher;

pub use event::{WatchEvent, WatchEventKind, WatchListener};
pub use state::ChannelWatch;
pub use target::resolve_target;
pub use watcher::{WatcherHandle, spawn_watcher};
