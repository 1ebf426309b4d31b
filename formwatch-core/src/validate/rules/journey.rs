use std::collections::HashSet;

use crate::types::Journey;
use crate::validate::rules::step;
use crate::validate::validator::Validator;

pub(crate) fn validate_journey(v: &mut Validator, j: &Journey, path: &str) {
    v.validate_extensions(path, &j.extensions);

    match url::Url::parse(&j.url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {}
        Ok(_) => v.push(format!("{path}.url"), "must be an http(s) URL with a host"),
        Err(e) => v.push(format!("{path}.url"), format!("invalid URL: {e}")),
    }

    if j.steps.is_empty() {
        v.push(format!("{path}.steps"), "must have at least one entry");
    }

    let mut step_ids = HashSet::<&str>::new();
    for (idx, s) in j.steps.iter().enumerate() {
        let spath = format!("{path}.steps[{idx}]");
        v.validate_id(&format!("{spath}.stepId"), &s.step_id);
        if !step_ids.insert(s.step_id.as_str()) {
            v.push(format!("{spath}.stepId"), "must be unique within the journey");
        }
        step::validate_step(v, s, &spath);
    }
}
