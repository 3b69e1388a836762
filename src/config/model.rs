// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{ChannelSlot, PollInterval, RawInterval};

/// Configuration as read from TOML, before validation.
///
/// ```toml
/// channels = ["https://twitcasting.tv/some_user", "", "other_user"]
///
/// [config]
/// check_interval = 60
/// auto_record = true
/// save_path = "recordings"
///
/// [tools]
/// ytdlp = "/usr/local/bin/yt-dlp"
/// ffmpeg = "ffmpeg"
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// One entry per channel slot, in slot order. Empty strings leave the
    /// slot unused.
    #[serde(default)]
    pub channels: Vec<String>,

    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub tools: ToolsSection,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigSection {
    /// Seconds between probes; integer or string. Clamped to >= 10, junk
    /// falls back to 60.
    #[serde(default)]
    pub check_interval: Option<RawInterval>,

    /// Start a recording automatically on each live edge.
    #[serde(default)]
    pub auto_record: bool,

    /// Recording root directory. Unset means the working directory.
    #[serde(default)]
    pub save_path: Option<PathBuf>,
}

/// `[tools]` section. Bare names are looked up through `PATH`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_ytdlp")]
    pub ytdlp: PathBuf,

    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
}

fn default_ytdlp() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            ytdlp: default_ytdlp(),
            ffmpeg: default_ffmpeg(),
        }
    }
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub channels: Vec<String>,
    pub interval: PollInterval,
    pub auto_record: bool,
    pub save_path: Option<PathBuf>,
    pub tools: ToolsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        let interval = raw
            .config
            .check_interval
            .map(PollInterval::from)
            .unwrap_or_default();
        let save_path = raw
            .config
            .save_path
            .filter(|p| !p.as_os_str().is_empty());

        Self {
            channels: raw.channels.into_iter().map(|c| c.trim().to_string()).collect(),
            interval,
            auto_record: raw.config.auto_record,
            save_path,
            tools: raw.tools,
        }
    }

    /// Non-empty channel entries with their slot.
    pub fn configured_channels(&self) -> impl Iterator<Item = (ChannelSlot, &str)> {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .filter_map(|(idx, c)| ChannelSlot::from_index(idx).map(|slot| (slot, c.as_str())))
    }
}
