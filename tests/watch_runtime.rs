// tests/watch_runtime.rs
//
// The async shell around the core, under paused tokio time.

use std::sync::Arc;
use std::time::Duration;

use assetdag::dag::TaskGraphBuilder;
use assetdag::engine::{CoreRuntime, RuleBinding, Runtime, WatchEvent};
use assetdag::exec::GraphExecutor;
use assetdag::types::TaskOutcome;
use assetdag_test_utils::fake_executor::FakeExecutor;
use assetdag_test_utils::fixtures::{RecordingSink, RecordingTask, event_log};
use assetdag_test_utils::init_tracing;
use tokio::sync::mpsc;
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_millis(200);

fn changed(rule: usize, path: &str) -> WatchEvent {
    WatchEvent::PathChanged {
        rule,
        path: path.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn dispatches_after_the_window_goes_quiet() {
    init_tracing();
    let (tx, rx) = mpsc::channel(32);
    let executor = FakeExecutor::manual(tx.clone());
    let dispatched = executor.dispatched();
    let sink = RecordingSink::new();
    let core = CoreRuntime::new(vec![RuleBinding::new("scss", WINDOW)], 1);
    let handle = tokio::spawn(Runtime::new(core, rx, executor, sink.clone()).run());

    tx.send(changed(0, "app/scss/a.scss")).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    tx.send(changed(0, "app/scss/b.scss")).await.unwrap();
    sleep(Duration::from_millis(150)).await;
    assert!(dispatched.lock().unwrap().is_empty(), "window was re-armed");

    sleep(Duration::from_millis(100)).await;
    assert_eq!(*dispatched.lock().unwrap(), vec!["scss".to_string()]);
    assert_eq!(sink.reloads(), 0, "no reload before completion");

    tx.send(WatchEvent::TaskCompleted {
        task: "scss".to_string(),
        outcome: TaskOutcome::Success,
    })
    .await
    .unwrap();
    sleep(Duration::from_millis(10)).await;
    assert_eq!(sink.reloads(), 1);

    tx.send(WatchEvent::ShutdownRequested).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_runs_do_not_reload() {
    init_tracing();
    let (tx, rx) = mpsc::channel(32);
    let executor = FakeExecutor::auto_complete(tx.clone(), TaskOutcome::Failed);
    let dispatched = executor.dispatched();
    let sink = RecordingSink::new();
    let core = CoreRuntime::new(vec![RuleBinding::new("js", WINDOW)], 1);
    let handle = tokio::spawn(Runtime::new(core, rx, executor, sink.clone()).run());

    tx.send(changed(0, "app/js/a.js")).await.unwrap();
    sleep(Duration::from_millis(300)).await;
    tx.send(changed(0, "app/js/a.js")).await.unwrap();
    sleep(Duration::from_millis(300)).await;

    assert_eq!(dispatched.lock().unwrap().len(), 2, "still watching after a failure");
    assert_eq!(sink.reloads(), 0);

    tx.send(WatchEvent::ShutdownRequested).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn exits_when_every_sender_is_gone() {
    init_tracing();
    let (tx, rx) = mpsc::channel(8);
    let (completions, _completions_rx) = mpsc::channel(8);
    let core = CoreRuntime::new(vec![RuleBinding::new("html", WINDOW)], 1);
    let executor = FakeExecutor::manual(completions);
    let handle = tokio::spawn(Runtime::new(core, rx, executor, RecordingSink::new()).run());

    tx.send(changed(0, "app/index.html")).await.unwrap();
    drop(tx);

    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn graph_runs_never_overlap_and_queue_one_follow_up() {
    init_tracing();
    let log = event_log();
    let scss = Arc::new(RecordingTask::new("scss", &log).with_delay(Duration::from_millis(500)));
    let mut builder = TaskGraphBuilder::new();
    builder.register("scss", scss.clone()).unwrap();
    let graph = Arc::new(builder.build().unwrap());

    let (tx, rx) = mpsc::channel(32);
    let sink = RecordingSink::new();
    let core = CoreRuntime::new(vec![RuleBinding::new("scss", WINDOW)], 1);
    let executor = GraphExecutor::new(graph, tx.clone());
    let handle = tokio::spawn(Runtime::new(core, rx, executor, sink.clone()).run());

    // First run spans 200ms..700ms.
    tx.send(changed(0, "a.scss")).await.unwrap();
    sleep(Duration::from_millis(250)).await;
    assert_eq!(scss.runs(), 1);

    // Two more windows close while it runs; they coalesce into one follow-up.
    tx.send(changed(0, "b.scss")).await.unwrap();
    sleep(Duration::from_millis(210)).await;
    tx.send(changed(0, "c.scss")).await.unwrap();
    sleep(Duration::from_millis(210)).await;
    assert_eq!(scss.runs(), 1);

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(scss.runs(), 2);
    assert_eq!(scss.max_concurrent(), 1);
    assert_eq!(sink.reloads(), 2);

    tx.send(WatchEvent::ShutdownRequested).await.unwrap();
    handle.await.unwrap().unwrap();
}
