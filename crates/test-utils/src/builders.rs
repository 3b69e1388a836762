#![allow(dead_code)]

use std::path::PathBuf;

use castwatch::config::{ConfigFile, RawConfigFile};
use castwatch::record::RecordingRequest;
use castwatch::types::RawInterval;

/// Builder for `RawConfigFile` / `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_channel(mut self, input: &str) -> Self {
        self.config.channels.push(input.to_string());
        self
    }

    pub fn with_interval(mut self, secs: i64) -> Self {
        self.config.config.check_interval = Some(RawInterval::Secs(secs));
        self
    }

    pub fn with_interval_text(mut self, text: &str) -> Self {
        self.config.config.check_interval = Some(RawInterval::Text(text.to_string()));
        self
    }

    pub fn auto_record(mut self, val: bool) -> Self {
        self.config.config.auto_record = val;
        self
    }

    pub fn with_save_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.config.save_path = Some(dir.into());
        self
    }

    pub fn with_ytdlp(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.ytdlp = path.into();
        self
    }

    pub fn with_ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.ffmpeg = path.into();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Recording request for `key` with placeholder tools.
pub fn request(key: &str, output_dir: impl Into<PathBuf>) -> RecordingRequest {
    RecordingRequest {
        key: key.to_string(),
        ytdlp: PathBuf::from("yt-dlp"),
        ffmpeg: PathBuf::from("ffmpeg"),
        output_dir: Some(output_dir.into()),
    }
}
