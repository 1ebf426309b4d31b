use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// Where alert fingerprints live. Without a database URL they are kept in memory for the
/// lifetime of the process.
#[derive(Debug, Args, Clone)]
pub struct StoreArgs {
    #[arg(long, env = "FORMWATCH_DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
    #[arg(long, default_value_t = 5)]
    pub max_connections: u32,
}

impl StoreArgs {
    pub fn resolved_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Args, Clone)]
pub struct SecretsArgs {
    /// `env` or `file:DIR`.
    #[arg(long, default_value = "env")]
    pub secrets: String,
    /// Prefix prepended to secret ids before the environment lookup.
    #[arg(long)]
    pub secrets_env_prefix: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct WebhookArgs {
    #[arg(long, env = "FORMWATCH_WEBHOOK_URL", hide_env_values = true)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct BrowserArgs {
    /// Show the browser window.
    #[arg(long)]
    pub headed: bool,
    #[arg(long)]
    pub chrome_executable: Option<PathBuf>,
    /// Proxy server (`host:port` or `socks5://host:port`); one is picked per launch.
    #[arg(long = "proxy", value_name = "SERVER")]
    pub proxies: Vec<String>,
    #[arg(long)]
    pub no_sandbox: bool,
    #[arg(long, default_value_t = 30)]
    pub launch_timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScreenshotMode {
    Never,
    Failure,
    Always,
}

/// Where run events go besides the progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EventOutput {
    /// Through the log, like everything else.
    Log,
    /// One JSON object per line on stdout.
    Stdout,
}

/// Options shared by `run` and `watch`.
#[derive(Debug, Args, Clone)]
pub struct MonitorArgs {
    /// Only run this journey (default: every journey in the document).
    #[arg(long)]
    pub journey: Option<String>,
    /// Type this code into every `{ generate: coupon }` input instead of generating one.
    #[arg(long)]
    pub coupon_code: Option<String>,
    /// Override the document's `settings.retries`.
    #[arg(long)]
    pub retries: Option<u32>,
    #[arg(long, value_enum, default_value_t = ScreenshotMode::Never)]
    pub screenshots: ScreenshotMode,
    #[arg(long, default_value = "screenshots")]
    pub screenshot_dir: PathBuf,
    /// Abandon a journey run after this many seconds.
    #[arg(long)]
    pub deadline_seconds: Option<u64>,
    /// Also send an informational message when a journey passes.
    #[arg(long)]
    pub notify_on_pass: bool,
    /// Print alerts to stdout instead of delivering them.
    #[arg(long)]
    pub dry_run: bool,
    /// Show step progress on stderr.
    #[arg(long)]
    pub progress: bool,
    #[arg(long, value_enum, default_value_t = EventOutput::Log)]
    pub events: EventOutput,
}

#[derive(Debug, Args, Clone)]
pub struct ScheduleArgs {
    #[arg(long, default_value_t = 300)]
    pub interval_seconds: u64,
    #[arg(long, default_value_t = 0)]
    pub jitter_min_seconds: u64,
    #[arg(long, default_value_t = 0)]
    pub jitter_max_seconds: u64,
    /// Exit with the alert code after the first alerted cycle.
    #[arg(long)]
    pub stop_on_alert: bool,
    /// Stop after this many cycles (default: run until interrupted).
    #[arg(long)]
    pub max_cycles: Option<u64>,
}
