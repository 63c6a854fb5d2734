// tests/orchestrator_fake_executor.rs

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bootdag::engine::{CompletionNotifier, RunStatus};
use bootdag::errors::BootdagError;
use bootdag::{JobError, Orchestrator, OrchestratorOptions};
use bootdag_test_utils::builders::noop_job;
use bootdag_test_utils::fake_executor::{FakeExecutor, LaunchLog, launch_log};
use bootdag_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn launched(log: &LaunchLog) -> Vec<Vec<String>> {
    log.lock()
        .unwrap()
        .iter()
        .map(|keys| {
            let mut keys = keys.clone();
            keys.sort();
            keys
        })
        .collect()
}

fn keys(levels: &[&[&str]]) -> Vec<Vec<String>> {
    levels
        .iter()
        .map(|l| l.iter().map(|k| k.to_string()).collect())
        .collect()
}

fn named(name: &str) -> Orchestrator {
    Orchestrator::new(OrchestratorOptions {
        name: name.to_string(),
        ..OrchestratorOptions::default()
    })
}

#[tokio::test]
async fn fan_out_finishes_and_reports_success_once() -> TestResult {
    init_tracing();

    let log = launch_log();
    let successes = Arc::new(Mutex::new(Vec::<String>::new()));
    let failures = Arc::new(AtomicUsize::new(0));

    let mut orch = named("boot");
    orch.register(noop_job("X", &[]))
        .register(noop_job("Y", &["X"]))
        .register(noop_job("Z", &["X"]));

    let s = Arc::clone(&successes);
    let f = Arc::clone(&failures);
    orch.on_success(move |name| s.lock().unwrap().push(name.to_string()))
        .on_failure(move |_, _, _| {
            f.fetch_add(1, Ordering::SeqCst);
        });

    let l = Arc::clone(&log);
    orch.start_with(move |n| FakeExecutor::new(n, l)).await?;

    let status = with_timeout(orch.wait()).await?;
    assert!(matches!(status, RunStatus::Finished));
    assert!(orch.is_finished());

    with_timeout(orch.join()).await?;

    assert_eq!(launched(&log), keys(&[&["X"], &["Y", "Z"]]));
    assert_eq!(*successes.lock().unwrap(), vec!["boot".to_string()]);
    assert_eq!(failures.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn failing_job_stops_the_run() -> TestResult {
    init_tracing();

    let log = launch_log();
    let seen = Arc::new(Mutex::new(Vec::<(String, String, String)>::new()));
    let successes = Arc::new(AtomicUsize::new(0));

    let mut orch = named("boot");
    orch.register(noop_job("X", &[]))
        .register(noop_job("Y", &["X"]))
        .register(noop_job("Z", &["X"]))
        .register(noop_job("W", &["Y", "Z"]));

    let s = Arc::clone(&seen);
    let ok = Arc::clone(&successes);
    orch.on_failure(move |name, job, cause| {
        s.lock()
            .unwrap()
            .push((name.to_string(), job.clone(), cause.to_string()));
    })
    .on_success(move |_| {
        ok.fetch_add(1, Ordering::SeqCst);
    });

    let l = Arc::clone(&log);
    orch.start_with(move |n| FakeExecutor::new(n, l).failing(&["Y"]))
        .await?;

    let status = with_timeout(orch.wait()).await?;
    match status {
        RunStatus::Failed(failure) => {
            assert_eq!(failure.job, "Y");
            assert_eq!(failure.cause.to_string(), "Y failed");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    with_timeout(orch.join()).await?;

    assert!(!orch.is_finished());
    assert_eq!(successes.load(Ordering::SeqCst), 0);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![("boot".to_string(), "Y".to_string(), "Y failed".to_string())]
    );
    // W is never launched.
    assert_eq!(launched(&log), keys(&[&["X"], &["Y", "Z"]]));

    Ok(())
}

#[tokio::test]
async fn concurrent_failures_fire_the_callback_once() -> TestResult {
    init_tracing();

    let failures = Arc::new(AtomicUsize::new(0));

    let mut orch = Orchestrator::default();
    orch.register(noop_job("A", &[]))
        .register(noop_job("B", &[]))
        .register(noop_job("C", &["A", "B"]));

    let f = Arc::clone(&failures);
    orch.on_failure(move |name, _, _| {
        assert_eq!(name, "bootdag");
        f.fetch_add(1, Ordering::SeqCst);
    });

    let log = launch_log();
    let l = Arc::clone(&log);
    orch.start_with(move |n| FakeExecutor::new(n, l).failing(&["A", "B"]))
        .await?;

    let status = with_timeout(orch.wait()).await?;
    assert!(matches!(status, RunStatus::Failed(_)));
    with_timeout(orch.join()).await?;

    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(launched(&log), keys(&[&["A", "B"]]));

    Ok(())
}

#[tokio::test]
async fn missing_dependency_launches_nothing_and_allows_retry() -> TestResult {
    init_tracing();

    let log = launch_log();
    let mut orch = Orchestrator::default();
    orch.register(noop_job("A", &["ghost"]));

    let l = Arc::clone(&log);
    let err = orch
        .start_with(move |n| FakeExecutor::new(n, l))
        .await
        .expect_err("start must fail");
    match err {
        BootdagError::MissingDependency(missing) => assert_eq!(missing, vec!["ghost".to_string()]),
        other => panic!("expected MissingDependency, got {other:?}"),
    }
    assert!(!orch.is_started());
    assert!(launched(&log).is_empty());
    assert!(matches!(orch.status(), RunStatus::NotStarted));

    // Registering the missing job makes the same orchestrator startable.
    orch.register(noop_job("ghost", &[]));
    let l = Arc::clone(&log);
    orch.start_with(move |n| FakeExecutor::new(n, l)).await?;

    let status = with_timeout(orch.wait()).await?;
    assert!(status.is_finished());
    assert_eq!(launched(&log), keys(&[&["ghost"], &["A"]]));

    Ok(())
}

#[tokio::test]
async fn cycle_launches_nothing() -> TestResult {
    init_tracing();

    let log = launch_log();
    let mut orch = Orchestrator::default();
    orch.register(noop_job("A", &["B"]))
        .register(noop_job("B", &["A"]));

    let l = Arc::clone(&log);
    let err = orch
        .start_with(move |n| FakeExecutor::new(n, l))
        .await
        .expect_err("start must fail");

    assert!(matches!(err, BootdagError::CycleDetected(_)));
    assert!(launched(&log).is_empty());
    assert!(!orch.is_started());

    Ok(())
}

#[tokio::test]
async fn second_start_is_rejected() -> TestResult {
    init_tracing();

    let mut orch = Orchestrator::default();
    orch.register(noop_job("A", &[]));

    let log = launch_log();
    let l = Arc::clone(&log);
    orch.start_with(move |n| FakeExecutor::new(n, l)).await?;

    let l = Arc::clone(&log);
    let err = orch
        .start_with(move |n| FakeExecutor::new(n, l))
        .await
        .expect_err("second start must fail");
    assert!(matches!(err, BootdagError::AlreadyStarted));

    with_timeout(orch.wait()).await?;
    assert_eq!(launched(&log), keys(&[&["A"]]));

    Ok(())
}

#[tokio::test]
async fn wait_before_start_is_an_error() {
    init_tracing();

    let orch = Orchestrator::default();
    assert!(matches!(orch.wait().await, Err(BootdagError::NotStarted)));
    assert!(!orch.is_finished());
}

#[tokio::test]
async fn empty_orchestrator_finishes_immediately() -> TestResult {
    init_tracing();

    let called = Arc::new(AtomicUsize::new(0));
    let mut orch = Orchestrator::default();
    let c = Arc::clone(&called);
    orch.on_success(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let log = launch_log();
    let l = Arc::clone(&log);
    orch.start_with(move |n| FakeExecutor::new(n, l)).await?;

    // The success callback fires during start, before any waiting.
    assert_eq!(called.load(Ordering::SeqCst), 1);
    assert!(orch.is_finished());
    assert!(launched(&log).is_empty());

    with_timeout(orch.join()).await?;
    Ok(())
}

#[tokio::test]
async fn late_completions_after_failure_are_drained() -> TestResult {
    init_tracing();

    let log = launch_log();
    let slot: Arc<Mutex<Option<CompletionNotifier>>> = Arc::new(Mutex::new(None));

    let mut orch = Orchestrator::default();
    orch.register(noop_job("A", &[]))
        .register(noop_job("B", &[]))
        .register(noop_job("C", &["A", "B"]));

    let l = Arc::clone(&log);
    let s = Arc::clone(&slot);
    orch.start_with(move |n| {
        *s.lock().unwrap() = Some(n.clone());
        FakeExecutor::new(n, l).manual()
    })
    .await?;

    let notifier = slot
        .lock()
        .unwrap()
        .clone()
        .expect("executor was built");

    assert!(matches!(orch.status(), RunStatus::Running));

    notifier.notify_failure("A", JobError::msg("A broke"));
    let status = with_timeout(orch.wait()).await?;
    assert!(matches!(status, RunStatus::Failed(ref f) if f.job == "A"));

    // B is still out; the coordinator keeps going until it reports.
    notifier.notify_success("B");
    with_timeout(orch.join()).await?;

    assert!(!orch.is_finished());
    assert_eq!(launched(&log), keys(&[&["A", "B"]]));

    Ok(())
}

#[tokio::test]
async fn registrations_after_start_are_ignored() -> TestResult {
    init_tracing();

    let mut orch = Orchestrator::default();
    orch.register(noop_job("A", &[]));

    let log = launch_log();
    let l = Arc::clone(&log);
    orch.start_with(move |n| FakeExecutor::new(n, l).manual()).await?;

    orch.register(noop_job("late", &[]));
    assert!(!orch.registry().contains("late"));
    assert_eq!(orch.registry().len(), 1);

    Ok(())
}
