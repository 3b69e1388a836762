// src/probe/mod.rs

//! Liveness probing.
//!
//! A probe answers one question for one channel: is it live right now? The
//! answer is a [`LiveStatus`]; callers interpret it through
//! [`LiveStatus::verdict`], which separates authoritative answers from probe
//! failures.
//!
//! - [`ytdlp`] implements the probe on top of the `yt-dlp` command line.

use std::future::Future;
use std::pin::Pin;
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

pub mod ytdlp;

pub use ytdlp::{YtDlpProbe, check_stream_status, parse_probe_json};

/// Base URL that channel identifiers are appended to.
pub const CHANNEL_BASE_URL: &str = "https://twitcasting.tv";

/// Full channel URL for a resolved target identifier.
pub fn channel_url(target: &str) -> String {
    format!("{CHANNEL_BASE_URL}/{target}")
}

static OFFLINE_DIAGNOSTIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)no video formats found|not currently live")
        .expect("offline diagnostic pattern is valid")
});

/// True when a tool diagnostic means "the stream is simply not live".
pub fn is_authoritative_offline(diagnostic: &str) -> bool {
    OFFLINE_DIAGNOSTIC.is_match(diagnostic)
}

/// Result of a single probe call.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStatus {
    pub is_live: bool,
    pub title: Option<String>,
    pub checked_at: DateTime<Local>,
    /// Set when the probe could not produce an answer. `is_live` is then
    /// meaningless unless the text is an offline diagnostic.
    pub error: Option<String>,
}

impl LiveStatus {
    pub fn live(title: Option<String>) -> Self {
        Self {
            is_live: true,
            title,
            checked_at: Local::now(),
            error: None,
        }
    }

    pub fn offline() -> Self {
        Self {
            is_live: false,
            title: None,
            checked_at: Local::now(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            is_live: false,
            title: None,
            checked_at: Local::now(),
            error: Some(error.into()),
        }
    }

    pub fn verdict(&self) -> ProbeVerdict {
        match &self.error {
            Some(err) if is_authoritative_offline(err) => ProbeVerdict::Offline,
            Some(err) => ProbeVerdict::Transient(err.clone()),
            None if self.is_live => ProbeVerdict::Live {
                title: self.title.clone(),
            },
            None => ProbeVerdict::Offline,
        }
    }
}

/// How a watcher must treat a [`LiveStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeVerdict {
    Live { title: Option<String> },
    Offline,
    /// No usable answer this cycle; liveness is unknown.
    Transient(String),
}

/// One live/offline check for a channel.
///
/// Production code uses [`YtDlpProbe`]; tests replay scripted results.
pub trait StatusProbe: Send + Sync {
    fn check<'a>(&'a self, target: &'a str)
    -> Pin<Box<dyn Future<Output = LiveStatus> + Send + 'a>>;
}
