use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use castwatch::record::{
    OutputStream, ProcessOutput, RecordingLauncher, RecordingProcess, RecordingRequest,
};
use tokio::io::{AsyncWriteExt, DuplexStream};

type Writer = Arc<tokio::sync::Mutex<DuplexStream>>;

/// A fake launcher that:
/// - records every launch (key + resolved output directory)
/// - hands each fake process an in-memory stdout the test can write to
/// - can refuse to spawn, fail termination, or terminate slowly per key
/// - can block inside `launch`, like a slow process spawn
#[derive(Default)]
pub struct FakeLauncher {
    launched: Mutex<Vec<(String, PathBuf)>>,
    writers: Mutex<HashMap<String, Writer>>,
    terminated: Mutex<HashMap<String, Arc<AtomicBool>>>,
    refuse_spawn: Mutex<HashSet<String>>,
    fail_terminate: Mutex<HashSet<String>>,
    terminate_delay: Mutex<Duration>,
    launch_delay: Mutex<Duration>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_spawn(&self, key: &str) {
        self.refuse_spawn.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_terminate(&self, key: &str) {
        self.fail_terminate.lock().unwrap().insert(key.to_string());
    }

    pub fn set_terminate_delay(&self, delay: Duration) {
        *self.terminate_delay.lock().unwrap() = delay;
    }

    /// Block the calling thread this long on every launch.
    pub fn set_launch_delay(&self, delay: Duration) {
        *self.launch_delay.lock().unwrap() = delay;
    }

    pub fn launched(&self) -> Vec<(String, PathBuf)> {
        self.launched.lock().unwrap().clone()
    }

    pub fn launch_count(&self, key: &str) -> usize {
        self.launched().iter().filter(|(k, _)| k == key).count()
    }

    /// Whether the latest process for `key` has been asked to terminate.
    pub fn was_terminated(&self, key: &str) -> bool {
        self.terminated
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Write one output line as the latest process for `key`.
    pub async fn emit(&self, key: &str, line: &str) -> io::Result<()> {
        let writer = self.writers.lock().unwrap().get(key).cloned();
        let Some(writer) = writer else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such process"));
        };
        let mut writer = writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }

    /// Write raw bytes (no newline added).
    pub async fn emit_raw(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let writer = self.writers.lock().unwrap().get(key).cloned();
        let Some(writer) = writer else {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such process"));
        };
        let mut writer = writer.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await
    }
}

impl RecordingLauncher for FakeLauncher {
    fn launch(
        &self,
        request: &RecordingRequest,
        output_dir: &Path,
    ) -> io::Result<Box<dyn RecordingProcess>> {
        let key = request.key.clone();
        let delay = *self.launch_delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.refuse_spawn.lock().unwrap().contains(&key) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "fake recorder refused to spawn",
            ));
        }

        let (reader, writer) = tokio::io::duplex(4096);
        let terminated = Arc::new(AtomicBool::new(false));

        self.launched
            .lock()
            .unwrap()
            .push((key.clone(), output_dir.to_path_buf()));
        self.writers
            .lock()
            .unwrap()
            .insert(key.clone(), Arc::new(tokio::sync::Mutex::new(writer)));
        self.terminated
            .lock()
            .unwrap()
            .insert(key.clone(), Arc::clone(&terminated));

        Ok(Box::new(FakeProcess {
            stdout: Some(reader),
            terminated,
            fail_terminate: self.fail_terminate.lock().unwrap().contains(&key),
            delay: *self.terminate_delay.lock().unwrap(),
        }))
    }
}

pub struct FakeProcess {
    stdout: Option<DuplexStream>,
    terminated: Arc<AtomicBool>,
    fail_terminate: bool,
    delay: Duration,
}

impl RecordingProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        None
    }

    fn take_output(&mut self) -> ProcessOutput {
        ProcessOutput {
            stdout: self.stdout.take().map(|s| Box::new(s) as OutputStream),
            stderr: None,
        }
    }

    fn terminate(
        &mut self,
        _grace: Duration,
    ) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            self.terminated.store(true, Ordering::SeqCst);
            if self.fail_terminate {
                Err(io::Error::other("injected terminate failure"))
            } else {
                Ok(())
            }
        })
    }
}
