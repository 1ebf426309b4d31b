use crate::types::{Action, StepDefinition};
use crate::validate::rules::{common::validate_input_value, common::validate_selector, expectation};
use crate::validate::validator::Validator;

pub(crate) fn validate_step(v: &mut Validator, step: &StepDefinition, path: &str) {
    v.validate_extensions(path, &step.extensions);

    let apath = format!("{path}.action");
    match &step.action {
        Action::FillField { selector, value } | Action::SelectOption { selector, value } => {
            validate_selector(v, &format!("{apath}.selector"), selector);
            validate_input_value(v, &format!("{apath}.value"), value);
        }
        Action::Click { selector } => {
            validate_selector(v, &format!("{apath}.selector"), selector);
        }
        Action::WaitOnly => {}
    }

    expectation::validate_expectation(v, &step.expectation, &format!("{path}.expectation"));

    if step.timeout_ms == Some(0) {
        v.push(format!("{path}.timeoutMs"), "must be greater than 0");
    }
}
