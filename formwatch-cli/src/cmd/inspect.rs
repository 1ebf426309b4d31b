use std::path::Path;

use formwatch_core::{InputValue, Journey, MonitorDocument, Settings};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::load_document;
use crate::OutputArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepInfo {
    step_id: String,
    action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    /// `literal`, `generated:<kind>` or `secret`; secret references are not echoed.
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<String>,
    expectation: String,
    selector: String,
    timeout_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JourneyInfo {
    journey_id: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    steps: Vec<StepInfo>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectResult {
    title: String,
    retries: u32,
    poll_interval_ms: u64,
    alert_cooldown_seconds: u64,
    journeys: Vec<JourneyInfo>,
}

fn describe_input(value: &InputValue) -> String {
    match value {
        InputValue::Literal(_) => "literal".to_string(),
        InputValue::Generated { generate } => format!("generated:{}", generate.as_str()),
        InputValue::Secret { .. } => "secret".to_string(),
    }
}

fn journey_info(journey: &Journey, settings: &Settings) -> JourneyInfo {
    let steps = journey
        .steps
        .iter()
        .map(|step| StepInfo {
            step_id: step.step_id.clone(),
            action: step.action.kind().to_string(),
            target: step.action.selector().map(str::to_string),
            input: step.action.input().map(describe_input),
            expectation: step.expectation.kind().to_string(),
            selector: step.expectation.selector().to_string(),
            timeout_ms: step.timeout_ms.unwrap_or(settings.default_timeout_ms),
        })
        .collect();
    JourneyInfo {
        journey_id: journey.journey_id.clone(),
        url: journey.url.clone(),
        description: journey.description.clone(),
        steps,
    }
}

fn inspect(doc: &MonitorDocument, journey_id: Option<&str>) -> Result<InspectResult, String> {
    let journeys = match journey_id {
        Some(id) => vec![doc.journey(id).ok_or_else(|| format!("journey not found: {id}"))?],
        None => doc.journeys.iter().collect(),
    };
    Ok(InspectResult {
        title: doc.info.title.clone(),
        retries: doc.settings.retries,
        poll_interval_ms: doc.settings.poll_interval_ms,
        alert_cooldown_seconds: doc.settings.alert_cooldown_seconds,
        journeys: journeys
            .into_iter()
            .map(|j| journey_info(j, &doc.settings))
            .collect(),
    })
}

pub async fn inspect_cmd(path: &Path, journey_id: Option<&str>, output: OutputArgs) -> i32 {
    let (doc, _) = match load_document(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e.describe());
            return e.exit_code();
        }
    };

    let result = match inspect(&doc, journey_id) {
        Ok(r) => r,
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            return exit_codes::INVALID_DOCUMENT;
        }
    };

    if output.format == OutputFormat::Text && !output.quiet {
        println!(
            "{} (retries: {}, cooldown: {}s)",
            result.title, result.retries, result.alert_cooldown_seconds
        );
        for journey in &result.journeys {
            println!();
            println!("journey {} -> {}", journey.journey_id, journey.url);
            for (i, step) in journey.steps.iter().enumerate() {
                let target = step.target.as_deref().unwrap_or("-");
                let input = step
                    .input
                    .as_deref()
                    .map(|i| format!(" [{i}]"))
                    .unwrap_or_default();
                println!(
                    "  {}. {}: {} {}{} => {} {} ({}ms)",
                    i + 1,
                    step.step_id,
                    step.action,
                    target,
                    input,
                    step.expectation,
                    step.selector,
                    step.timeout_ms
                );
            }
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
