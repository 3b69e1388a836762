// src/record/mod.rs

//! Recording process supervision.
//!
//! - [`supervisor`] owns the key → recording registry and the start/stop
//!   operations.
//! - [`launcher`] abstracts spawning a recorder; [`ToolLauncher`] runs
//!   `yt-dlp`, tests plug in fakes.
//! - [`command`] builds the recorder's argument list and output template.
//! - [`relay`] forwards recorder output to the sink.
//! - [`terminate`] implements graceful-then-forced process shutdown.

pub mod command;
pub mod launcher;
pub mod relay;
pub mod supervisor;
pub mod terminate;

pub use launcher::{
    ChildProcess, OutputStream, ProcessOutput, RecordingLauncher, RecordingProcess,
    RecordingRequest, ToolLauncher,
};
pub use supervisor::{RecordingSupervisor, SupervisorOptions};
pub use terminate::DEFAULT_GRACE;
