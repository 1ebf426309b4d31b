use std::collections::BTreeMap;
use std::path::Path;

use formwatch_core::{Journey, MonitorDocument};
use formwatch_exec::RunReport;
use tokio_util::sync::CancellationToken;

use crate::cmd::config::{build_monitor, MonitorSetup};
use crate::exit_codes;
use crate::output::{print_error, print_report};
use crate::utils::load_document;
use crate::{BrowserArgs, MonitorArgs, OutputArgs, SecretsArgs, StoreArgs, WebhookArgs};

/// Picks the journeys to run: the named one, or all of them in document order.
pub fn select_journeys<'a>(
    doc: &'a MonitorDocument,
    journey_id: Option<&str>,
) -> Result<Vec<&'a Journey>, String> {
    match journey_id {
        None => Ok(doc.journeys.iter().collect()),
        Some(id) => doc
            .journey(id)
            .map(|j| vec![j])
            .ok_or_else(|| format!("journey not found: {id}")),
    }
}

pub fn steps_per_journey(journeys: &[&Journey]) -> BTreeMap<String, usize> {
    journeys
        .iter()
        .map(|j| (j.journey_id.clone(), j.steps.len()))
        .collect()
}

/// One monitoring cycle: every journey runs sequentially and gets its own report. Stops early
/// when `cancel` fires.
pub async fn run_cycle(
    setup: &MonitorSetup,
    journeys: &[&Journey],
    cancel: &CancellationToken,
) -> Vec<RunReport> {
    let mut reports = Vec::with_capacity(journeys.len());
    for journey in journeys {
        if cancel.is_cancelled() && !reports.is_empty() {
            break;
        }
        let report = setup
            .controller
            .run(journey, &setup.settings, cancel)
            .await;
        reports.push(report);
    }
    reports
}

pub fn cycle_exit_code(reports: &[RunReport]) -> i32 {
    reports
        .iter()
        .map(RunReport::exit_code)
        .fold(exit_codes::SUCCESS, exit_codes::worst)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_cmd(
    path: &Path,
    monitor: MonitorArgs,
    output: OutputArgs,
    store: StoreArgs,
    secrets: SecretsArgs,
    webhook: WebhookArgs,
    browser: BrowserArgs,
    cancel: &CancellationToken,
) -> i32 {
    let (doc, _) = match load_document(path) {
        Ok(v) => v,
        Err(e) => {
            print_error(output.format, output.quiet, &e.describe());
            return e.exit_code();
        }
    };
    let journeys = match select_journeys(&doc, monitor.journey.as_deref()) {
        Ok(j) => j,
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            return exit_codes::INVALID_DOCUMENT;
        }
    };

    let setup = match build_monitor(
        &doc.settings,
        &monitor,
        &store,
        &secrets,
        &webhook,
        &browser,
        steps_per_journey(&journeys),
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::INFRASTRUCTURE_ERROR;
        }
    };

    let reports = run_cycle(&setup, &journeys, cancel).await;
    for report in &reports {
        print_report(&output, report);
    }
    cycle_exit_code(&reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwatch_core::{parse_document_str, DocumentFormat};

    const DOC: &str = r##"
formwatch: 1.0.0
info: { title: t, version: "1" }
journeys:
  - journeyId: first
    url: https://example.com/a
    steps:
      - stepId: s1
        action: { type: click, selector: "#go" }
        expectation: { type: element-visible, selector: "#done" }
  - journeyId: second
    url: https://example.com/b
    steps:
      - stepId: s1
        action: { type: wait-only }
        expectation: { type: element-visible, selector: "#done" }
      - stepId: s2
        action: { type: click, selector: "#close" }
        expectation: { type: element-absent, selector: "#done" }
"##;

    #[test]
    fn selects_all_or_named_journey() {
        let doc = parse_document_str(DOC, DocumentFormat::Yaml).unwrap().document;
        let all = select_journeys(&doc, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(steps_per_journey(&all)["second"], 2);

        let one = select_journeys(&doc, Some("second")).unwrap();
        assert_eq!(one[0].journey_id, "second");

        assert!(select_journeys(&doc, Some("missing")).is_err());
    }
}
