// src/record/terminate.rs

//! Graceful-then-forced termination of a recorder process tree.
//!
//! Unix: SIGINT to the process group (the recorder runs in its own group),
//! then SIGKILL to the group. Windows: `taskkill /T`, then `taskkill /F /T`.
//!
//! On Windows the recorder has no console of its own, so no Ctrl-C can be
//! delivered to it. `taskkill /T` only posts a close request, which console
//! programs such as yt-dlp do not act on; in practice the recorder is
//! force-killed once the grace window has passed.

use std::io;
use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, warn};

/// Time a recorder gets to exit after the interrupt.
pub const DEFAULT_GRACE: Duration = if cfg!(windows) {
    Duration::from_secs(2)
} else {
    Duration::from_secs(3)
};

/// Stop `child`, waiting at most `grace` after each step.
pub async fn terminate_child(child: &mut Child, grace: Duration) -> io::Result<()> {
    if let Some(status) = child.try_wait()? {
        debug!(?status, "recorder already exited");
        return Ok(());
    }

    if let Err(e) = interrupt(child).await {
        debug!(error = %e, "interrupt failed; escalating");
    } else if let Ok(status) = tokio::time::timeout(grace, child.wait()).await {
        let status = status?;
        debug!(?status, "recorder exited after interrupt");
        return Ok(());
    }

    warn!(pid = ?child.id(), "recorder still running after grace window; killing");
    force_kill(child).await?;

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => {
            let status = status?;
            debug!(?status, "recorder killed");
            Ok(())
        }
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "recorder did not exit after forced kill",
        )),
    }
}

#[cfg(unix)]
async fn interrupt(child: &mut Child) -> io::Result<()> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pid = child.id().ok_or_else(exited)?;
    killpg(Pid::from_raw(pid as i32), Signal::SIGINT)?;
    Ok(())
}

#[cfg(unix)]
async fn force_kill(child: &mut Child) -> io::Result<()> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };
    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        debug!(error = %e, "killpg failed; killing recorder directly");
        child.start_kill()?;
    }
    Ok(())
}

/// Close request for the process tree; see the module docs for its limits.
#[cfg(windows)]
async fn interrupt(child: &mut Child) -> io::Result<()> {
    let pid = child.id().ok_or_else(exited)?;
    taskkill(&["/T", "/PID", &pid.to_string()]).await
}

#[cfg(windows)]
async fn force_kill(child: &mut Child) -> io::Result<()> {
    let Some(pid) = child.id() else {
        return Ok(());
    };
    if let Err(e) = taskkill(&["/F", "/T", "/PID", &pid.to_string()]).await {
        debug!(error = %e, "taskkill failed; killing recorder directly");
        child.start_kill()?;
    }
    Ok(())
}

#[cfg(windows)]
async fn taskkill(args: &[&str]) -> io::Result<()> {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    let status = tokio::process::Command::new("taskkill")
        .args(args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .creation_flags(CREATE_NO_WINDOW)
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("taskkill exited with {status}")))
    }
}

fn exited() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "recorder process already reaped")
}
