//! Turns CLI flags and the journey document's settings into a wired [`RunController`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use formwatch_core::Settings;
use formwatch_exec::browser::{ChromiumConfig, ChromiumLauncher, ProxyPool};
use formwatch_exec::controller::{ScreenshotConfig, ScreenshotPolicy};
use formwatch_exec::executor::{
    CompositeEventSink, StdoutEventSink, TracingEventSink, ValueResolver,
};
use formwatch_exec::generate::{CouponGenerator, CouponPolicy, PolicyGenerator};
use formwatch_exec::http::ReqwestHttpClient;
use formwatch_exec::notify::{Notifier, StdoutNotifier, WebhookNotifier};
use formwatch_exec::retry::RetryConfig;
use formwatch_exec::secrets::{
    CompositeProvider, EnvSecretsProvider, FileSecretsProvider, SecretsProvider,
};
use formwatch_exec::{AlertDispatcher, DispatchConfig, RunConfig, RunController};
use formwatch_store::{FingerprintStore, MemoryFingerprintStore, PostgresFingerprintStore};
use secrecy::SecretString;

use crate::cmd::progress::ProgressEventSink;
use crate::utils::redact_url_password;
use crate::{
    BrowserArgs, EventOutput, MonitorArgs, ScreenshotMode, SecretsArgs, StoreArgs, WebhookArgs,
};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("unsupported secrets provider `{0}` (expected `env` or `file:DIR`)")]
    SecretsProvider(String),
    #[error("failed to connect to fingerprint store at {url}: {message}")]
    Store { url: String, message: String },
    #[error("invalid webhook configuration: {0}")]
    Webhook(String),
}

/// `env` reads `secrets://NAME` from the environment; `file:DIR` reads `DIR/NAME` first and
/// falls back to the environment.
pub fn build_secrets(args: &SecretsArgs) -> Result<Arc<dyn SecretsProvider>, SetupError> {
    let env = EnvSecretsProvider {
        env_prefix: args.secrets_env_prefix.clone(),
        ..EnvSecretsProvider::default()
    };
    match args.secrets.as_str() {
        "env" => Ok(Arc::new(env)),
        s => match s.strip_prefix("file:") {
            Some(dir) if !dir.is_empty() => Ok(Arc::new(CompositeProvider::new(vec![
                Box::new(FileSecretsProvider::new(dir)),
                Box::new(env),
            ]))),
            _ => Err(SetupError::SecretsProvider(s.to_string())),
        },
    }
}

pub async fn build_store(args: &StoreArgs) -> Result<Arc<dyn FingerprintStore>, SetupError> {
    match args.resolved_url() {
        None => {
            tracing::debug!("no database url; alert fingerprints are kept in memory");
            Ok(Arc::new(MemoryFingerprintStore::new()))
        }
        Some(url) => PostgresFingerprintStore::connect(&url, args.max_connections)
            .await
            .map(|store| Arc::new(store) as Arc<dyn FingerprintStore>)
            .map_err(|e| SetupError::Store {
                url: redact_url_password(&url),
                message: e.to_string(),
            }),
    }
}

pub fn build_notifier(
    webhook: &WebhookArgs,
    dry_run: bool,
) -> Result<Arc<dyn Notifier>, SetupError> {
    if dry_run {
        return Ok(Arc::new(StdoutNotifier));
    }
    match webhook.webhook_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            let http = ReqwestHttpClient::new().map_err(|e| SetupError::Webhook(e.to_string()))?;
            let notifier = WebhookNotifier::new(SecretString::from(url.to_string()), Arc::new(http))
                .map_err(|e| SetupError::Webhook(e.to_string()))?;
            Ok(Arc::new(notifier))
        }
        _ => {
            tracing::warn!("no webhook url configured; alerts will be printed to stdout");
            Ok(Arc::new(StdoutNotifier))
        }
    }
}

pub fn chromium_config(browser: &BrowserArgs, settings: &Settings) -> ChromiumConfig {
    ChromiumConfig {
        headless: !browser.headed,
        executable: browser.chrome_executable.clone(),
        navigation_timeout: settings.navigation_timeout(),
        proxies: ProxyPool::new(browser.proxies.iter()),
        sandbox: !browser.no_sandbox,
        ..ChromiumConfig::default()
    }
}

pub fn screenshot_config(monitor: &MonitorArgs) -> ScreenshotConfig {
    let policy = match monitor.screenshots {
        ScreenshotMode::Never => ScreenshotPolicy::Never,
        ScreenshotMode::Failure => ScreenshotPolicy::Failure,
        ScreenshotMode::Always => ScreenshotPolicy::Always,
    };
    ScreenshotConfig {
        policy,
        dir: PathBuf::from(&monitor.screenshot_dir),
    }
}

/// Long-lived collaborators shared by every run of one CLI invocation. In `watch` mode the
/// fingerprint store inside the dispatcher outlives individual cycles.
pub struct MonitorSetup {
    pub controller: RunController,
    pub settings: Settings,
}

/// The base sink for `output`, plus a progress line on stderr when step counts are given.
pub fn build_event_sink(
    output: EventOutput,
    progress: Option<BTreeMap<String, usize>>,
) -> CompositeEventSink {
    let mut sinks = CompositeEventSink::new();
    match output {
        EventOutput::Log => sinks.add(Box::new(TracingEventSink)),
        EventOutput::Stdout => sinks.add(Box::new(StdoutEventSink)),
    }
    if let Some(steps_per_journey) = progress {
        sinks.add(Box::new(ProgressEventSink::new(steps_per_journey)));
    }
    sinks
}

pub async fn build_monitor(
    settings: &Settings,
    monitor: &MonitorArgs,
    store: &StoreArgs,
    secrets: &SecretsArgs,
    webhook: &WebhookArgs,
    browser: &BrowserArgs,
    steps_per_journey: BTreeMap<String, usize>,
) -> Result<MonitorSetup, SetupError> {
    let mut settings = settings.clone();
    if let Some(retries) = monitor.retries {
        settings.retries = retries;
    }

    let secrets = build_secrets(secrets)?;
    let policy = CouponPolicy::from_option(monitor.coupon_code.as_deref());
    if policy.is_forced() {
        tracing::info!("coupon code forced from the command line");
    }
    let generator = Arc::new(PolicyGenerator::new(CouponGenerator::new(), policy));
    let resolver = Arc::new(ValueResolver::new(generator, secrets));

    let dispatcher = AlertDispatcher::new(
        build_store(store).await?,
        build_notifier(webhook, monitor.dry_run)?,
        DispatchConfig {
            retry: RetryConfig::default().with_retries(settings.retries),
            cooldown: settings.alert_cooldown(),
            notify_on_pass: monitor.notify_on_pass,
        },
    );

    let progress = monitor.progress.then_some(steps_per_journey);
    let events = Arc::new(build_event_sink(monitor.events, progress));

    let launcher = Arc::new(ChromiumLauncher::new(chromium_config(browser, &settings)));
    let controller = RunController::new(
        launcher,
        resolver,
        Arc::new(dispatcher),
        events,
        RunConfig {
            launch_timeout: Duration::from_secs(browser.launch_timeout_seconds),
            screenshots: screenshot_config(monitor),
            deadline: monitor.deadline_seconds.map(Duration::from_secs),
            ..RunConfig::default()
        },
    );

    Ok(MonitorSetup {
        controller,
        settings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_provider_accepts_env_and_file_dirs() {
        let env = SecretsArgs {
            secrets: "env".to_string(),
            secrets_env_prefix: None,
        };
        assert!(build_secrets(&env).is_ok());

        let file = SecretsArgs {
            secrets: "file:/run/secrets".to_string(),
            secrets_env_prefix: None,
        };
        assert!(build_secrets(&file).is_ok());

        let vault = SecretsArgs {
            secrets: "vault".to_string(),
            secrets_env_prefix: None,
        };
        assert!(matches!(
            build_secrets(&vault),
            Err(SetupError::SecretsProvider(_))
        ));
    }

    #[test]
    fn webhook_must_be_http() {
        let webhook = WebhookArgs {
            webhook_url: Some("ftp://hooks.example.com/x".to_string()),
        };
        assert!(matches!(
            build_notifier(&webhook, false),
            Err(SetupError::Webhook(_))
        ));
        assert!(build_notifier(&webhook, true).is_ok());
    }

    #[test]
    fn progress_adds_a_second_event_sink() {
        assert_eq!(build_event_sink(EventOutput::Log, None).len(), 1);
        let steps = BTreeMap::from([("checkout".to_string(), 3)]);
        assert_eq!(build_event_sink(EventOutput::Stdout, Some(steps)).len(), 2);
    }
}
