use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod output;
mod utils;

pub use args::*;
use commands::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "formwatch", version, about = "Synthetic monitor for web forms")]
struct Cli {
    /// Log line format on stderr. Verbosity comes from `FORMWATCH_LOG` (default `info`).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_env("FORMWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A second init (tests embedding the binary) is harmless.
    let _ = match format {
        LogFormat::Text => builder.with_target(false).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::INFRASTRUCTURE_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            trigger.cancel();
        }
    });
    token
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Run {
            path,
            monitor,
            output,
            store,
            secrets,
            webhook,
            browser,
        } => {
            let cancel = shutdown_token();
            cmd::run::run_cmd(&path, monitor, output, store, secrets, webhook, browser, &cancel).await
        }
        Command::Watch {
            path,
            schedule,
            monitor,
            output,
            store,
            secrets,
            webhook,
            browser,
        } => {
            let cancel = shutdown_token();
            cmd::watch::watch_cmd(
                &path, schedule, monitor, output, store, secrets, webhook, browser, &cancel,
            )
            .await
        }
        Command::Validate { path, output } => cmd::validate::validate_cmd(&path, output).await,
        Command::Inspect {
            path,
            journey,
            output,
        } => cmd::inspect::inspect_cmd(&path, journey.as_deref(), output).await,
        Command::Coupon {
            count,
            seed,
            output,
        } => cmd::coupon::coupon_cmd(count, seed, output).await,
        Command::Migrate { store, output } => cmd::migrate::migrate_cmd(store, output).await,
        Command::Doctor {
            store,
            secrets,
            webhook,
            browser,
            output,
        } => cmd::doctor::doctor_cmd(store, secrets, webhook, browser, output).await,
    }
}
