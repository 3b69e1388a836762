pub mod builders;
pub mod fake_launcher;
pub mod fake_probe;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, Once};

use castwatch::sink::Sink;
use castwatch::watch::{WatchEvent, WatchEventKind, WatchListener};
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Sink that keeps every line it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(Option<String>, String)>>,
}

impl CollectingSink {
    pub fn lines(&self) -> Vec<(Option<String>, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// Lines forwarded for recording `key`.
    pub fn output_of(&self, key: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(k, _)| k.as_deref() == Some(key))
            .map(|(_, line)| line)
            .collect()
    }

    /// Lines not tied to a recording.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(k, _)| k.is_none())
            .map(|(_, line)| line)
            .collect()
    }
}

impl Sink for CollectingSink {
    fn line(&self, key: Option<&str>, line: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((key.map(str::to_string), line.to_string()));
    }
}

/// Watch listener that records every event.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<WatchEvent>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<WatchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<WatchEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    pub fn edges(&self) -> Vec<WatchEventKind> {
        self.kinds().into_iter().filter(|k| k.is_edge()).collect()
    }
}

impl WatchListener for EventLog {
    fn on_event<'a>(
        &'a self,
        event: &'a WatchEvent,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.events.lock().unwrap().push(event.clone());
        Box::pin(async {})
    }
}
