use formwatch_exec::{RunReport, RunStatus};
use serde::Serialize;

use crate::OutputArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn print_result<T: Serialize>(format: OutputFormat, quiet: bool, result: &T) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{json}");
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(result) {
                println!("{json}");
            }
        }
    }
}

pub fn print_error(format: OutputFormat, quiet: bool, message: &str) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => eprintln!("error: {message}"),
        OutputFormat::Json => {
            let err = serde_json::json!({"error": message});
            eprintln!("{}", serde_json::to_string(&err).unwrap_or_default());
        }
    }
}

/// One report per journey run: a short summary in text mode, a JSON line otherwise.
pub fn print_report(output: &OutputArgs, report: &RunReport) {
    if output.format == OutputFormat::Json || output.quiet {
        print_result(output.format, output.quiet, report);
        return;
    }

    let attempts = report.attempts.len();
    println!(
        "{}: {} ({} attempt{}, run {})",
        report.journey_id,
        report.status,
        attempts,
        if attempts == 1 { "" } else { "s" },
        report.run_id
    );
    match report.status {
        RunStatus::Alerted | RunStatus::Suppressed => {
            if let Some(dev) = report.last_attempt().and_then(|a| a.deviation()) {
                println!("  step {}: {} ({})", dev.step_id, dev.kind, dev.severity);
                println!("  expected: {}", dev.expected);
                println!("  observed: {}", dev.observed);
            }
            if let Some(reason) = report.alert.as_ref().and_then(|a| a.suppressed_reason) {
                println!("  suppressed: {reason}");
            }
        }
        RunStatus::InfrastructureError => {
            if let Some(err) = &report.error {
                println!("  error: {err}");
            }
        }
        RunStatus::Passed => {}
    }
    for shot in &report.screenshots {
        println!("  screenshot: {}", shot.display());
    }
}
