// src/record/relay.rs

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use super::launcher::{OutputStream, ProcessOutput};
use crate::sink::SharedSink;

/// Decode bytes as UTF-8, dropping invalid sequences instead of failing.
pub fn decode_permissive(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Spawn the relay for one recording.
///
/// Reads stdout and stderr line by line as one stream and forwards every
/// non-empty line to `sink` with `key`, as long as `still_active()` holds.
/// Lines from a recording that has left the registry are dropped.
pub fn spawn_output_relay<F>(
    key: String,
    output: ProcessOutput,
    sink: SharedSink,
    still_active: F,
) -> JoinHandle<()>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut stdout = output.stdout.map(BufReader::new);
        let mut stderr = output.stderr.map(BufReader::new);
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();

        let forward = |buf: &[u8]| {
            let decoded = decode_permissive(buf);
            let line = decoded.trim();
            if line.is_empty() {
                return;
            }
            if still_active() {
                sink.line(Some(&key), line);
            } else {
                debug!(%key, "dropping output from inactive recording");
            }
        };

        while stdout.is_some() || stderr.is_some() {
            tokio::select! {
                res = read_line(&mut stdout, &mut out_buf), if stdout.is_some() => {
                    if settle(res, &mut stdout, &out_buf) {
                        forward(&out_buf);
                    }
                    out_buf.clear();
                }
                res = read_line(&mut stderr, &mut err_buf), if stderr.is_some() => {
                    if settle(res, &mut stderr, &err_buf) {
                        forward(&err_buf);
                    }
                    err_buf.clear();
                }
            }
        }

        debug!(%key, "output relay ended");
    })
}

async fn read_line(
    reader: &mut Option<BufReader<OutputStream>>,
    buf: &mut Vec<u8>,
) -> std::io::Result<usize> {
    match reader {
        Some(r) => r.read_until(b'\n', buf).await,
        None => std::future::pending().await,
    }
}

/// Close the reader on EOF or error; true when `buf` holds a line to forward.
fn settle(
    res: std::io::Result<usize>,
    reader: &mut Option<BufReader<OutputStream>>,
    buf: &[u8],
) -> bool {
    match res {
        Ok(0) => {
            *reader = None;
            false
        }
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "output pipe read failed");
            *reader = None;
            !buf.is_empty()
        }
    }
}
