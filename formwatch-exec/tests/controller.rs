mod support;

use std::sync::Arc;
use std::time::Duration;

use formwatch_core::MonitorDocument;
use formwatch_exec::alert::{AlertDispatcher, DispatchConfig, SuppressedReason};
use formwatch_exec::browser::{BrowserError, BrowserLauncher};
use formwatch_exec::controller::{
    RunConfig, RunController, RunState, RunStatus, ScreenshotConfig, ScreenshotPolicy,
};
use formwatch_exec::executor::{EventSink, ValueResolver};
use formwatch_exec::generate::{CouponGenerator, CouponPolicy, PolicyGenerator};
use formwatch_exec::notify::Notifier;
use formwatch_exec::retry::RetryConfig;
use formwatch_exec::secrets::EnvSecretsProvider;
use formwatch_store::MemoryFingerprintStore;
use tokio_util::sync::CancellationToken;

use support::{document, field, visible, FakeLauncher, PageScript, RecordingNotifier, RecordingSink};

const DOC: &str = r##"
formwatch: 1.0.0
info: { title: Checkout, version: "1" }
settings: { pollIntervalMs: 250, defaultTimeoutMs: 3000, retries: 1, alertCooldownSeconds: 600 }
journeys:
  - journeyId: checkout
    url: https://shop.example.com/cart
    steps:
      - stepId: fill-coupon
        action: { type: fill-field, selector: "#coupon", value: { generate: coupon } }
        expectation: { type: element-visible, selector: "#coupon" }
      - stepId: apply-coupon
        action: { type: click, selector: "#apply" }
        expectation: { type: element-text-equals, selector: "#discount-total", expected: "$10.00 off" }
"##;

fn passing_page() -> PageScript {
    PageScript::default()
        .with("#coupon", field())
        .with("#apply", visible("Apply"))
        .with("#discount-total", visible("$0.00 off"))
        .on("#apply", "#discount-total", Duration::from_millis(500), Some(visible("$10.00 off")))
}

fn failing_page() -> PageScript {
    let mut script = passing_page();
    script.reactions.clear();
    script
}

struct Harness {
    doc: MonitorDocument,
    launcher: Arc<FakeLauncher>,
    notifier: Arc<RecordingNotifier>,
    sink: Arc<RecordingSink>,
    controller: RunController,
}

fn harness(launcher: FakeLauncher, notifier: RecordingNotifier, config: RunConfig) -> Harness {
    let doc = document(DOC);
    let launcher = Arc::new(launcher);
    let notifier = Arc::new(notifier);
    let sink = Arc::new(RecordingSink::default());
    let resolver = Arc::new(ValueResolver::new(
        Arc::new(PolicyGenerator::new(CouponGenerator::with_seed(3), CouponPolicy::Generate)),
        Arc::new(EnvSecretsProvider::default()),
    ));
    let dispatcher = Arc::new(
        AlertDispatcher::new(
            Arc::new(MemoryFingerprintStore::new()),
            notifier.clone() as Arc<dyn Notifier>,
            DispatchConfig {
                retry: RetryConfig::default().with_retries(doc.settings.retries),
                cooldown: doc.settings.alert_cooldown(),
                notify_on_pass: false,
            },
        )
        .with_seed(1),
    );
    let controller = RunController::new(
        launcher.clone() as Arc<dyn BrowserLauncher>,
        resolver,
        dispatcher,
        sink.clone() as Arc<dyn EventSink>,
        config,
    );
    Harness {
        doc,
        launcher,
        notifier,
        sink,
        controller,
    }
}

impl Harness {
    async fn run(&self, cancel: &CancellationToken) -> formwatch_exec::RunReport {
        self.controller
            .run(&self.doc.journeys[0], &self.doc.settings, cancel)
            .await
    }
}

#[tokio::test(start_paused = true)]
async fn passing_run_walks_the_happy_path() {
    let h = harness(
        FakeLauncher::new(vec![passing_page()]),
        RecordingNotifier::default(),
        RunConfig::default(),
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::Passed);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        report.transitions,
        vec![
            RunState::Init,
            RunState::BrowserReady,
            RunState::Executing,
            RunState::Passed,
            RunState::Teardown,
            RunState::Done
        ]
    );
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(h.launcher.counters.launches(), 1);
    assert_eq!(h.launcher.counters.closes(), 1);
    assert!(h.notifier.sent().is_empty());
    assert_eq!(report.metrics.steps_passed, 2);
    assert_eq!(report.metrics.status, Some(RunStatus::Passed));
    assert_eq!(h.sink.names().first(), Some(&"run.started"));
    assert_eq!(h.sink.names().last(), Some(&"run.finished"));
}

#[tokio::test(start_paused = true)]
async fn launch_failure_is_an_infrastructure_error() {
    let h = harness(
        FakeLauncher::failing(BrowserError::Launch("chrome not found".into())),
        RecordingNotifier::default(),
        RunConfig::default(),
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::InfrastructureError);
    assert_eq!(report.exit_code(), 2);
    assert!(report.error.as_deref().unwrap().contains("chrome not found"));
    assert!(report.attempts.is_empty());
    assert!(report.alert.is_none());
    assert!(h.notifier.sent().is_empty());
    assert_eq!(h.launcher.counters.launches(), 1);
    assert_eq!(
        report.transitions,
        vec![RunState::Init, RunState::Teardown, RunState::Done]
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_deviation_is_retried_then_alerted() {
    let h = harness(
        FakeLauncher::new(vec![failing_page()]),
        RecordingNotifier::default(),
        RunConfig::default(),
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::Alerted);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(h.launcher.counters.launches(), 2);
    assert_eq!(h.launcher.counters.closes(), 2);
    assert_eq!(
        report.transitions,
        vec![
            RunState::Init,
            RunState::BrowserReady,
            RunState::Executing,
            RunState::Teardown,
            RunState::BrowserReady,
            RunState::Executing,
            RunState::FailedAlerted,
            RunState::Teardown,
            RunState::Done
        ]
    );
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("apply-coupon"));
    assert!(sent[0].contains("$0.00 off"));
    assert!(h.sink.names().contains(&"retry.scheduled"));
    assert!(h.sink.names().contains(&"alert.sent"));
    assert_eq!(report.metrics.retries, 1);
    assert_eq!(report.metrics.alerts_sent, 1);

    // Each attempt typed its own coupon.
    let fills: Vec<String> = h
        .launcher
        .actions()
        .into_iter()
        .filter(|a| a.starts_with("fill #coupon="))
        .collect();
    assert_eq!(fills.len(), 2);
    assert_ne!(fills[0], fills[1]);
}

#[tokio::test(start_paused = true)]
async fn transient_failure_is_absorbed_by_the_retry() {
    let h = harness(
        FakeLauncher::new(vec![failing_page(), passing_page()]),
        RecordingNotifier::default(),
        RunConfig::default(),
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::Suppressed);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        report.alert.as_ref().unwrap().suppressed_reason,
        Some(SuppressedReason::RetrySucceeded)
    );
    assert!(h.notifier.sent().is_empty());
    assert!(report.transitions.contains(&RunState::FailedSuppressed));
}

#[tokio::test(start_paused = true)]
async fn cancellation_reaches_teardown_and_is_not_a_deviation() {
    let h = harness(
        FakeLauncher::new(vec![failing_page()]),
        RecordingNotifier::default(),
        RunConfig::default(),
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let report = h.run(&cancel).await;

    assert_eq!(report.status, RunStatus::InfrastructureError);
    assert_eq!(report.error.as_deref(), Some("run cancelled"));
    assert!(report.attempts.is_empty());
    assert!(h.notifier.sent().is_empty());
    assert_eq!(h.launcher.counters.closes(), h.launcher.counters.launches());
    assert_eq!(
        &report.transitions[report.transitions.len() - 2..],
        &[RunState::Teardown, RunState::Done]
    );
}

#[tokio::test(start_paused = true)]
async fn deadline_is_reported_distinctly_from_cancellation() {
    let h = harness(
        FakeLauncher::new(vec![failing_page()]),
        RecordingNotifier::default(),
        RunConfig {
            deadline: Some(Duration::from_secs(2)),
            ..RunConfig::default()
        },
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::InfrastructureError);
    assert!(report.error.as_deref().unwrap().contains("deadline"));
    assert_eq!(h.launcher.counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_alert_delivery_is_an_infrastructure_error() {
    let h = harness(
        FakeLauncher::new(vec![failing_page()]),
        RecordingNotifier::failing(),
        RunConfig::default(),
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::InfrastructureError);
    assert_eq!(report.exit_code(), 2);
    assert!(report.error.as_deref().unwrap().contains("deliver"));
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(h.launcher.counters.closes(), 2);
}

#[tokio::test(start_paused = true)]
async fn navigation_failure_still_closes_the_browser() {
    let mut script = passing_page();
    script.navigation_error = Some(BrowserError::Navigation {
        url: "https://shop.example.com/cart".into(),
        message: "net::ERR_PROXY_CONNECTION_FAILED".into(),
    });
    let h = harness(
        FakeLauncher::new(vec![script]),
        RecordingNotifier::default(),
        RunConfig::default(),
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::InfrastructureError);
    assert!(report.error.as_deref().unwrap().contains("ERR_PROXY_CONNECTION_FAILED"));
    assert_eq!(h.launcher.counters.launches(), 1);
    assert_eq!(h.launcher.counters.closes(), 1);
    assert!(!report.transitions.contains(&RunState::BrowserReady));
}

#[tokio::test(start_paused = true)]
async fn failure_screenshots_are_linked_from_the_alert() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(
        FakeLauncher::new(vec![failing_page()]),
        RecordingNotifier::default(),
        RunConfig {
            screenshots: ScreenshotConfig {
                policy: ScreenshotPolicy::Failure,
                dir: dir.path().join("shots"),
            },
            ..RunConfig::default()
        },
    );

    let report = h.run(&CancellationToken::new()).await;

    assert_eq!(report.status, RunStatus::Alerted);
    assert_eq!(report.screenshots.len(), 2);
    for path in &report.screenshots {
        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("checkout_apply-coupon_"), "{name}");
        assert!(name.ends_with(".png"));
    }
    assert_ne!(report.screenshots[0], report.screenshots[1]);
    let last = report.screenshots.last().unwrap().display().to_string();
    assert!(h.notifier.sent()[0].contains(&last));
}
