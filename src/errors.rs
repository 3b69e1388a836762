// src/errors.rs

//! Crate-wide error types.
//!
//! `CastwatchError` covers configuration and watcher start-up failures.
//! Recording start/stop have their own small enums because callers branch
//! on them (the idempotency guards are expected, not exceptional).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("invalid channel target: {input:?}")]
    InvalidTarget { input: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of `RecordingSupervisor::start_recording`.
#[derive(Error, Debug)]
pub enum StartError {
    #[error("{key}: recording already in progress")]
    AlreadyActive { key: String },

    #[error("cannot prepare output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{key}: failed to spawn recorder: {source}")]
    SpawnError {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Failure of `RecordingSupervisor::stop_recording`.
///
/// `Terminate` is diagnostic only: the registry entry is already gone by the
/// time it is returned.
#[derive(Error, Debug)]
pub enum StopError {
    #[error("{key}: no recording in progress")]
    NotActive { key: String },

    #[error("{key}: error while stopping recorder: {source}")]
    Terminate {
        key: String,
        #[source]
        source: io::Error,
    },
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CastwatchError>;
