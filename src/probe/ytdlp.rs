// src/probe/ytdlp.rs

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use super::{LiveStatus, StatusProbe, channel_url, is_authoritative_offline};
use crate::record::relay::decode_permissive;

/// Upper bound for one probe invocation.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// Probe backed by `yt-dlp --dump-single-json`.
#[derive(Debug, Clone)]
pub struct YtDlpProbe {
    tool: PathBuf,
    timeout: Duration,
}

impl YtDlpProbe {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tool(&self) -> &Path {
        &self.tool
    }
}

impl StatusProbe for YtDlpProbe {
    fn check<'a>(
        &'a self,
        target: &'a str,
    ) -> Pin<Box<dyn Future<Output = LiveStatus> + Send + 'a>> {
        Box::pin(check_stream_status(target, &self.tool, self.timeout))
    }
}

/// Run the status tool once for `target` and interpret its result.
///
/// Never fails: every problem is folded into `LiveStatus::error`, except the
/// "not live" diagnostics which become a plain offline answer.
pub async fn check_stream_status(target: &str, tool: &Path, timeout: Duration) -> LiveStatus {
    let url = channel_url(target);
    debug!(%target, tool = %tool.display(), "probing channel");

    let mut cmd = Command::new(tool);
    cmd.arg("--skip-download")
        .arg("--dump-single-json")
        .arg("--no-warnings")
        .arg(&url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => return LiveStatus::failed(format!("timeout ({timeout:?})")),
        Ok(Err(e)) => return LiveStatus::failed(format!("failed to run {}: {e}", tool.display())),
        Ok(Ok(output)) => output,
    };

    if output.status.success() && !output.stdout.is_empty() {
        return parse_probe_json(&output.stdout);
    }

    let diagnostic = decode_permissive(&output.stderr).trim().to_string();
    if is_authoritative_offline(&diagnostic) {
        return LiveStatus::offline();
    }

    if diagnostic.is_empty() {
        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        LiveStatus::failed(format!("exit code {code}"))
    } else {
        LiveStatus::failed(diagnostic)
    }
}

/// Interpret the tool's JSON document.
///
/// yt-dlp only emits a document for this site while the channel is live, so
/// a missing `is_live` field counts as live.
pub fn parse_probe_json(stdout: &[u8]) -> LiveStatus {
    let doc: Value = match serde_json::from_slice(stdout) {
        Ok(doc) => doc,
        Err(e) => return LiveStatus::failed(format!("JSON parse error: {e}")),
    };

    let is_live = doc.get("is_live").and_then(Value::as_bool).unwrap_or(true);
    let title = ["title", "fulltitle"]
        .iter()
        .filter_map(|field| doc.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string);

    if is_live {
        LiveStatus::live(title)
    } else {
        LiveStatus {
            title,
            ..LiveStatus::offline()
        }
    }
}
