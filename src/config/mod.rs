// src/config/mod.rs

//! Configuration loading and validation for castwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate channel count and tool paths (`validate.rs`).
//!
//! Configuration is read-only; nothing here writes settings back.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, ToolsSection};
pub use validate::validate_config;
