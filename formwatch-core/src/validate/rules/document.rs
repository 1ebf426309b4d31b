use std::collections::HashSet;

use crate::types::{Info, MonitorDocument};
use crate::validate::rules::{journey, settings};
use crate::validate::validator::Validator;

pub(crate) fn validate_document(v: &mut Validator, doc: &MonitorDocument) {
    v.validate_extensions("$", &doc.extensions);
    v.validate_format_version("$.formwatch", &doc.formwatch);

    validate_info(v, &doc.info, "$.info");
    settings::validate_settings(v, &doc.settings, "$.settings");

    if doc.journeys.is_empty() {
        v.push("$.journeys", "must have at least one entry");
    }

    let mut journey_ids = HashSet::<&str>::new();
    for (idx, j) in doc.journeys.iter().enumerate() {
        let path = format!("$.journeys[{idx}]");
        v.validate_id(&format!("{path}.journeyId"), &j.journey_id);
        if !journey_ids.insert(j.journey_id.as_str()) {
            v.push(format!("{path}.journeyId"), "must be unique");
        }
        journey::validate_journey(v, j, &path);
    }
}

fn validate_info(v: &mut Validator, info: &Info, path: &str) {
    v.validate_extensions(path, &info.extensions);
    for (field, value) in [("title", &info.title), ("version", &info.version)] {
        if value.trim().is_empty() {
            v.push(format!("{path}.{field}"), "must not be empty");
        }
    }
}
