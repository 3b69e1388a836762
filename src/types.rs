// src/types.rs

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::de::IgnoredAny;

/// Number of fixed channel slots.
pub const MAX_CHANNELS: usize = 4;

/// Identity of one of the fixed channel slots (1-based, `1..=MAX_CHANNELS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelSlot(u8);

impl ChannelSlot {
    pub fn new(n: usize) -> Option<Self> {
        if (1..=MAX_CHANNELS).contains(&n) {
            Some(Self(n as u8))
        } else {
            None
        }
    }

    /// Slot for the zero-based position in a channel list.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::new(idx + 1)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = ChannelSlot> {
        (1..=MAX_CHANNELS).map(|n| ChannelSlot(n as u8))
    }
}

impl fmt::Display for ChannelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.0)
    }
}

/// Seconds between two probe cycles of a watcher.
///
/// Values below [`PollInterval::MIN_SECS`] are clamped up; unparsable input
/// falls back to [`PollInterval::DEFAULT_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInterval(u64);

impl PollInterval {
    pub const MIN_SECS: u64 = 10;
    pub const DEFAULT_SECS: u64 = 60;

    pub fn from_secs(secs: i64) -> Self {
        Self(secs.max(Self::MIN_SECS as i64) as u64)
    }

    /// Parse user input such as `"90"`, `" 5 "` or `"abc"`.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(secs) => Self::from_secs(secs),
            Err(_) => Self::default(),
        }
    }

    pub fn secs(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

/// Any TOML value given for `check_interval`.
///
/// Integers and strings are interpreted; anything else (floats, booleans,
/// tables) falls back to the default interval.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawInterval {
    Secs(i64),
    Text(String),
    Other(IgnoredAny),
}

impl From<RawInterval> for PollInterval {
    fn from(raw: RawInterval) -> Self {
        match raw {
            RawInterval::Secs(secs) => PollInterval::from_secs(secs),
            RawInterval::Text(s) => PollInterval::parse(&s),
            RawInterval::Other(_) => PollInterval::default(),
        }
    }
}

/// Lifecycle state of a channel watch.
///
/// `Failed` marks a polling cycle whose probe gave no usable answer; the
/// watcher keeps polling afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
    #[default]
    Idle,
    Polling,
    ObservedLive,
    ObservedOffline,
    Failed,
}
