// src/record/launcher.rs

//! Pluggable recorder process backend.
//!
//! The supervisor talks to a `RecordingLauncher` instead of spawning
//! processes directly, so tests can substitute in-memory processes while
//! production uses [`ToolLauncher`].

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::info;

use super::command::recording_args;
use super::terminate::terminate_child;

/// What to record and with which tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingRequest {
    /// Channel target identifier; the registry key.
    pub key: String,
    pub ytdlp: PathBuf,
    pub ffmpeg: PathBuf,
    /// `None` records into the current working directory.
    pub output_dir: Option<PathBuf>,
}

pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Both output pipes of a recorder; the relay reads them as one stream.
#[derive(Default)]
pub struct ProcessOutput {
    pub stdout: Option<OutputStream>,
    pub stderr: Option<OutputStream>,
}

/// A running recorder, exclusively owned by its registry entry.
pub trait RecordingProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Hand the output pipes over to the relay. Later calls return nothing.
    fn take_output(&mut self) -> ProcessOutput;

    /// Ask the process to exit, forcing it after `grace`.
    fn terminate(
        &mut self,
        grace: Duration,
    ) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>>;
}

pub trait RecordingLauncher: Send + Sync {
    /// Spawn a recorder writing below `output_dir` (already created).
    fn launch(
        &self,
        request: &RecordingRequest,
        output_dir: &Path,
    ) -> io::Result<Box<dyn RecordingProcess>>;
}

/// Launches `yt-dlp` in resume mode with ffmpeg remuxing to mp4.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolLauncher;

impl RecordingLauncher for ToolLauncher {
    fn launch(
        &self,
        request: &RecordingRequest,
        output_dir: &Path,
    ) -> io::Result<Box<dyn RecordingProcess>> {
        let mut cmd = Command::new(&request.ytdlp);
        cmd.args(recording_args(&request.key, &request.ffmpeg, output_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so the interrupt and the kill reach ffmpeg too.
        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        cmd.creation_flags(0x0800_0000);

        let child = cmd.spawn()?;
        info!(key = %request.key, pid = ?child.id(), dir = %output_dir.display(), "recorder spawned");
        Ok(Box::new(ChildProcess { child }))
    }
}

/// [`RecordingProcess`] over a real child process.
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
}

impl RecordingProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn take_output(&mut self) -> ProcessOutput {
        ProcessOutput {
            stdout: self
                .child
                .stdout
                .take()
                .map(|s| Box::new(s) as OutputStream),
            stderr: self
                .child
                .stderr
                .take()
                .map(|s| Box::new(s) as OutputStream),
        }
    }

    fn terminate(
        &mut self,
        grace: Duration,
    ) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(terminate_child(&mut self.child, grace))
    }
}
