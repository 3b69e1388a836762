// src/sink.rs

//! The external line sink.
//!
//! Watchers, the orchestrator and the output relays all report through one
//! `Sink`. `key` is set for recorder output and names the recording that
//! produced the line. Implementations must tolerate calls from any task.

use std::sync::Arc;

pub trait Sink: Send + Sync {
    fn line(&self, key: Option<&str>, line: &str);
}

impl<F> Sink for F
where
    F: Fn(Option<&str>, &str) + Send + Sync,
{
    fn line(&self, key: Option<&str>, line: &str) {
        self(key, line)
    }
}

pub type SharedSink = Arc<dyn Sink>;

/// Prints every line on stdout; logs stay on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn line(&self, key: Option<&str>, line: &str) {
        match key {
            Some(key) => println!("[yt-dlp][{key}] {line}"),
            None => println!("{line}"),
        }
    }
}
