use serde::Serialize;

use formwatch_store::PostgresFingerprintStore;

use crate::cmd::config::{build_notifier, build_secrets};
use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::utils::redact_url_password;
use crate::{BrowserArgs, OutputArgs, SecretsArgs, StoreArgs, WebhookArgs};

#[derive(Serialize)]
struct Check {
    name: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Check {
    fn new(name: &str, status: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: status.to_string(),
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct DoctorResult {
    checks: Vec<Check>,
    all_passed: bool,
}

pub async fn doctor_cmd(
    store: StoreArgs,
    secrets: SecretsArgs,
    webhook: WebhookArgs,
    browser: BrowserArgs,
    output: OutputArgs,
) -> i32 {
    let checks = vec![
        check_database(&store).await,
        check_secrets(&secrets),
        check_webhook(&webhook),
        check_browser(&browser),
    ];

    // Warnings do not fail the doctor; errors do.
    let all_passed = checks.iter().all(|c| c.status != "error");
    let result = DoctorResult { checks, all_passed };

    if output.format == OutputFormat::Text && !output.quiet {
        println!("Environment checks:");
        for c in &result.checks {
            let icon = match c.status.as_str() {
                "ok" => "✓",
                "warning" => "!",
                _ => "✗",
            };
            print!("  {} {}: {}", icon, c.name, c.status);
            if let Some(msg) = &c.message {
                print!(" - {msg}");
            }
            println!();
        }
        if result.all_passed {
            println!("\nAll checks passed.");
        } else {
            println!("\nSome checks failed.");
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if all_passed {
        exit_codes::SUCCESS
    } else {
        exit_codes::INFRASTRUCTURE_ERROR
    }
}

async fn check_database(store: &StoreArgs) -> Check {
    match store.resolved_url() {
        None => Check::new(
            "fingerprint-store",
            "warning",
            "no database URL configured; fingerprints are kept in memory",
        ),
        Some(url) => match PostgresFingerprintStore::connect(&url, 1).await {
            Ok(_) => Check::new(
                "fingerprint-store",
                "ok",
                format!("connected to {}", redact_url_password(&url)),
            ),
            Err(e) => Check::new("fingerprint-store", "error", format!("connection failed: {e}")),
        },
    }
}

fn check_secrets(secrets: &SecretsArgs) -> Check {
    if let Err(e) = build_secrets(secrets) {
        return Check::new("secrets", "error", e.to_string());
    }
    match secrets.secrets.strip_prefix("file:") {
        Some(dir) if !std::path::Path::new(dir).is_dir() => {
            Check::new("secrets", "error", format!("secrets directory not found: {dir}"))
        }
        Some(dir) => Check::new("secrets", "ok", format!("file provider: {dir}")),
        None => Check::new("secrets", "ok", "using environment variables"),
    }
}

fn check_webhook(webhook: &WebhookArgs) -> Check {
    match webhook.webhook_url.as_deref().map(str::trim) {
        None | Some("") => Check::new(
            "webhook",
            "warning",
            "no webhook URL configured; alerts will be printed to stdout",
        ),
        Some(_) => match build_notifier(webhook, false) {
            Ok(_) => Check::new("webhook", "ok", "endpoint configured"),
            Err(e) => Check::new("webhook", "error", e.to_string()),
        },
    }
}

fn check_browser(browser: &BrowserArgs) -> Check {
    match &browser.chrome_executable {
        Some(path) if path.is_file() => {
            Check::new("browser", "ok", format!("executable: {}", path.display()))
        }
        Some(path) => Check::new(
            "browser",
            "error",
            format!("executable not found: {}", path.display()),
        ),
        None => Check::new(
            "browser",
            "ok",
            "chromium will be located on PATH at launch",
        ),
    }
}
