use regex::Regex;

use crate::types::Expectation;
use crate::validate::rules::common::validate_selector;
use crate::validate::validator::Validator;

pub(crate) fn validate_expectation(v: &mut Validator, e: &Expectation, path: &str) {
    validate_selector(v, &format!("{path}.selector"), e.selector());

    if let Expectation::ElementTextMatchesPattern { pattern, .. } = e {
        if let Err(err) = Regex::new(pattern) {
            v.push(format!("{path}.pattern"), format!("invalid regex: {err}"));
        }
    }
}
