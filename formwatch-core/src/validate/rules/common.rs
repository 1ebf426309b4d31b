use crate::types::InputValue;
use crate::validate::validator::Validator;

pub(crate) fn validate_selector(v: &mut Validator, path: &str, selector: &str) {
    if selector.trim().is_empty() {
        v.push(path, "must not be empty");
    }
}

pub(crate) fn validate_input_value(v: &mut Validator, path: &str, value: &InputValue) {
    if let InputValue::Secret { secret } = value {
        validate_secret_ref(v, &format!("{path}.secret"), secret);
    }
}

/// Secret references look like `scheme://id`; the scheme follows URI scheme syntax.
fn validate_secret_ref(v: &mut Validator, path: &str, reference: &str) {
    let Some((scheme, id)) = reference.trim().split_once("://") else {
        v.push(path, "must be URI-like (e.g. secrets://NAME)");
        return;
    };
    let mut chars = scheme.chars();
    let scheme_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok {
        v.push(path, format!("invalid secret scheme: {scheme:?}"));
    }
    if id.is_empty() {
        v.push(path, "secret id must not be empty");
    }
}
