use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run each selected journey once and alert on confirmed deviations.
    Run {
        path: PathBuf,
        #[command(flatten)]
        monitor: MonitorArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        secrets: SecretsArgs,
        #[command(flatten)]
        webhook: WebhookArgs,
        #[command(flatten)]
        browser: BrowserArgs,
    },
    /// Repeat `run` on an interval until interrupted.
    Watch {
        path: PathBuf,
        #[command(flatten)]
        schedule: ScheduleArgs,
        #[command(flatten)]
        monitor: MonitorArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        secrets: SecretsArgs,
        #[command(flatten)]
        webhook: WebhookArgs,
        #[command(flatten)]
        browser: BrowserArgs,
    },
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    Inspect {
        path: PathBuf,
        #[arg(long)]
        journey: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print freshly generated coupon codes.
    Coupon {
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    Migrate {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    Doctor {
        #[command(flatten)]
        store: StoreArgs,
        #[command(flatten)]
        secrets: SecretsArgs,
        #[command(flatten)]
        webhook: WebhookArgs,
        #[command(flatten)]
        browser: BrowserArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}
