// tests/supervisor_registry.rs

mod common;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use castwatch::errors::{StartError, StopError};
use castwatch::record::{RecordingSupervisor, SupervisorOptions};
use castwatch_test_utils::builders::request;
use castwatch_test_utils::fake_launcher::FakeLauncher;
use common::{CollectingSink, init_tracing, wait_until, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn supervisor() -> (RecordingSupervisor, Arc<FakeLauncher>, Arc<CollectingSink>) {
    let launcher = Arc::new(FakeLauncher::new());
    let sink = Arc::new(CollectingSink::default());
    let sup = RecordingSupervisor::new(
        launcher.clone(),
        sink.clone(),
        SupervisorOptions {
            grace: Duration::from_millis(200),
        },
    );
    (sup, launcher, sink)
}

#[tokio::test]
async fn start_twice_keeps_one_recorder() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, _sink) = supervisor();

    let msg = sup.start_recording(&request("a", dir.path()))?;
    assert_eq!(msg, "recording started: a");

    let second = sup.start_recording(&request("a", dir.path()));
    assert!(matches!(second, Err(StartError::AlreadyActive { ref key }) if key == "a"));

    assert_eq!(launcher.launch_count("a"), 1);
    assert!(sup.is_recording("a"));
    Ok(())
}

#[tokio::test]
async fn stop_unknown_key_is_not_active() {
    init_tracing();
    let (sup, _launcher, _sink) = supervisor();

    let result = sup.stop_recording("nobody").await;
    assert!(matches!(result, Err(StopError::NotActive { ref key }) if key == "nobody"));
}

#[tokio::test]
async fn stop_removes_entry_and_terminates() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, _sink) = supervisor();

    sup.start_recording(&request("a", dir.path()))?;
    let msg = with_timeout(sup.stop_recording("a")).await?;

    assert_eq!(msg, "recording stopped: a");
    assert!(!sup.is_recording("a"));
    assert!(launcher.was_terminated("a"));
    assert!(sup.list_active().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_terminate_still_leaves_key_inactive() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, _sink) = supervisor();
    launcher.fail_terminate("a");

    sup.start_recording(&request("a", dir.path()))?;
    let result = with_timeout(sup.stop_recording("a")).await;

    assert!(matches!(result, Err(StopError::Terminate { .. })));
    assert!(!sup.is_recording("a"));

    // The key can be recorded again right away.
    sup.start_recording(&request("a", dir.path()))?;
    assert_eq!(launcher.launch_count("a"), 2);
    Ok(())
}

#[tokio::test]
async fn stop_all_continues_past_a_failure() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, _sink) = supervisor();
    launcher.fail_terminate("b");

    for key in ["a", "b", "c"] {
        sup.start_recording(&request(key, dir.path()))?;
    }
    assert_eq!(
        sup.list_active().into_iter().collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );

    let results = with_timeout(sup.stop_all_recordings()).await;

    let keys: Vec<_> = results.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert!(results[0].1.is_ok());
    assert!(matches!(results[1].1, Err(StopError::Terminate { .. })));
    assert!(results[2].1.is_ok());

    assert!(sup.list_active().is_empty());
    for key in ["a", "b", "c"] {
        assert!(launcher.was_terminated(key), "{key} was not terminated");
    }
    Ok(())
}

#[tokio::test]
async fn spawn_failure_registers_nothing() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, _sink) = supervisor();
    launcher.refuse_spawn("a");

    let result = sup.start_recording(&request("a", dir.path()));

    assert!(matches!(result, Err(StartError::SpawnError { ref key, .. }) if key == "a"));
    assert!(!sup.is_recording("a"));
    assert!(launcher.launched().is_empty());
    Ok(())
}

#[tokio::test]
async fn output_directory_is_created() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("nested").join("deeper");
    let (sup, launcher, _sink) = supervisor();

    sup.start_recording(&request("a", &target))?;

    assert!(target.is_dir());
    assert_eq!(launcher.launched(), vec![("a".to_string(), target)]);
    Ok(())
}

#[tokio::test]
async fn unusable_output_directory_is_reported() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory")?;
    let (sup, launcher, _sink) = supervisor();

    let result = sup.start_recording(&request("a", blocker.join("sub")));

    assert!(matches!(result, Err(StartError::OutputDir { .. })));
    assert!(!sup.is_recording("a"));
    assert!(launcher.launched().is_empty());
    Ok(())
}

#[tokio::test]
async fn relay_forwards_tagged_lines() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, sink) = supervisor();

    sup.start_recording(&request("a", dir.path()))?;
    sup.start_recording(&request("b", dir.path()))?;

    launcher.emit("a", "[download] Destination: foo.mp4").await?;
    launcher.emit("b", "   ").await?;
    launcher.emit("b", "frame=  100 fps=30\r").await?;

    wait_until(5, || sink.output_of("a").len() == 1 && sink.output_of("b").len() == 1).await;
    assert_eq!(sink.output_of("a"), vec!["[download] Destination: foo.mp4"]);
    assert_eq!(sink.output_of("b"), vec!["frame=  100 fps=30"]);
    assert!(sink.messages().is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_utf8_is_dropped_not_fatal() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, sink) = supervisor();

    sup.start_recording(&request("a", dir.path()))?;
    launcher.emit_raw("a", b"ok \xff\xfeline\n").await?;
    launcher.emit_raw("a", b"\xff\n").await?;
    launcher.emit("a", "after").await?;

    wait_until(5, || sink.output_of("a").len() == 2).await;
    assert_eq!(sink.output_of("a"), vec!["ok line", "after"]);
    Ok(())
}

#[tokio::test]
async fn output_during_stop_is_dropped() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, sink) = supervisor();
    launcher.set_terminate_delay(Duration::from_millis(300));

    sup.start_recording(&request("a", dir.path()))?;
    launcher.emit("a", "before").await?;
    wait_until(5, || sink.output_of("a").len() == 1).await;

    let (stopped, emitted) = tokio::join!(sup.stop_recording("a"), async {
        wait_until(5, || !sup.is_recording("a")).await;
        let res = launcher.emit("a", "late line").await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        res
    });
    stopped?;
    emitted?;

    assert_eq!(sink.output_of("a"), vec!["before"]);
    Ok(())
}

#[tokio::test]
async fn key_stays_reserved_until_recorder_has_terminated() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, _sink) = supervisor();
    launcher.set_terminate_delay(Duration::from_millis(300));

    sup.start_recording(&request("a", dir.path()))?;

    let (stopped, restart) = tokio::join!(sup.stop_recording("a"), async {
        wait_until(5, || sup.is_stopping("a")).await;
        sup.start_recording(&request("a", dir.path()))
    });
    stopped?;

    assert!(
        matches!(restart, Err(StartError::AlreadyActive { ref key }) if key == "a"),
        "restart during termination must be refused: {restart:?}"
    );
    assert_eq!(launcher.launch_count("a"), 1);
    assert!(!sup.is_stopping("a"));
    assert!(!sup.is_recording("a"));

    // Once termination is over the key is free again.
    sup.start_recording(&request("a", dir.path()))?;
    assert_eq!(launcher.launch_count("a"), 2);
    Ok(())
}

#[tokio::test]
async fn stopping_key_is_not_listed_or_stopped_twice() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let (sup, launcher, _sink) = supervisor();
    launcher.set_terminate_delay(Duration::from_millis(200));

    sup.start_recording(&request("a", dir.path()))?;

    let (first, second) = tokio::join!(sup.stop_recording("a"), async {
        wait_until(5, || sup.is_stopping("a")).await;
        assert!(sup.list_active().is_empty());
        sup.stop_recording("a").await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(StopError::NotActive { .. })));
    Ok(())
}
