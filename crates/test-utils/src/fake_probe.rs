use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use castwatch::probe::{LiveStatus, StatusProbe};
use tokio::sync::Notify;

/// A fake probe that:
/// - replays a fixed list of results, one per call
/// - keeps repeating the last result once the list is used up
/// - signals `exhausted()` when that happens
pub struct ScriptedProbe {
    script: Mutex<VecDeque<LiveStatus>>,
    last: Mutex<LiveStatus>,
    calls: AtomicUsize,
    exhausted: Notify,
}

impl ScriptedProbe {
    pub fn new(script: impl IntoIterator<Item = LiveStatus>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(LiveStatus::offline()),
            calls: AtomicUsize::new(0),
            exhausted: Notify::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resolves once every scripted result has been handed out.
    pub async fn exhausted(&self) {
        self.exhausted.notified().await;
    }

    fn next_status(&self) -> LiveStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(status) => {
                *self.last.lock().unwrap() = status.clone();
                status
            }
            None => {
                self.exhausted.notify_one();
                self.last.lock().unwrap().clone()
            }
        }
    }
}

impl StatusProbe for ScriptedProbe {
    fn check<'a>(
        &'a self,
        _target: &'a str,
    ) -> Pin<Box<dyn Future<Output = LiveStatus> + Send + 'a>> {
        let status = self.next_status();
        Box::pin(async move { status })
    }
}
