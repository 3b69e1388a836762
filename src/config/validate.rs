// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CastwatchError, Result};
use crate::types::MAX_CHANNELS;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::CastwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_channels(cfg)?;
    validate_tool("ytdlp", &cfg.tools.ytdlp)?;
    validate_tool("ffmpeg", &cfg.tools.ffmpeg)?;
    Ok(())
}

fn validate_channels(cfg: &RawConfigFile) -> Result<()> {
    if cfg.channels.len() > MAX_CHANNELS {
        return Err(CastwatchError::ConfigError(format!(
            "at most {MAX_CHANNELS} channels are supported (got {})",
            cfg.channels.len()
        )));
    }
    Ok(())
}

/// A bare name is left to `PATH` lookup; anything that looks like a path
/// must point at an existing file.
fn validate_tool(name: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(CastwatchError::ConfigError(format!(
            "[tools].{name} must not be empty"
        )));
    }

    if path.components().count() > 1 && !path.is_file() {
        return Err(CastwatchError::ConfigError(format!(
            "[tools].{name} does not point to a file: {}",
            path.display()
        )));
    }
    Ok(())
}
