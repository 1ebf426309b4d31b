use std::time::Duration;

use formwatch_core::{
    parse_document_str, validate_document, Action, DocumentFormat, Expectation, ExpectationKind,
    GeneratorKind, InputValue, TextSource,
};

fn coupon_yaml() -> &'static str {
    r##"
formwatch: 1.0.0
info:
  title: Coupon redemption
  version: 0.1.0
settings:
  pollIntervalMs: 200
  retries: 2
journeys:
  - journeyId: redeem-invalid-coupon
    url: https://example.com/coupon
    steps:
      - stepId: select-region
        action: { type: select-option, selector: "#eRedeemRegion", value: na }
        expectation: { type: element-text-equals, selector: "#eRedeemRegion", expected: na, source: value }
      - stepId: fill-member-code
        action: { type: fill-field, selector: "#eRedeemNpaCode", value: { secret: "secrets://MEMBER_CODE" } }
        expectation: { type: element-enabled, selector: "#eRedeemNpaCode" }
      - stepId: fill-coupon
        action: { type: fill-field, selector: "#eRedeemCoupon", value: { generate: coupon } }
        expectation: { type: element-visible, selector: "#eRedeemCoupon" }
      - stepId: redeem
        action: { type: click, selector: "button.btn_confirm" }
        expectation: { type: element-visible, selector: "#popAlert.pop.on" }
        timeoutMs: 12000
      - stepId: popup-message
        action: { type: wait-only }
        expectation:
          type: element-text-equals
          selector: "#popAlert p.pop_msg"
          source: html
          expected: "The coupon cannot be used in this game.<br>Please check the coupon number again."
      - stepId: popup-closed
        action: { type: click, selector: "#popAlert .btn_close" }
        expectation: { type: element-absent, selector: "#popAlert.pop.on" }
"##
}

#[test]
fn parse_yaml_and_validate_ok() {
    let parsed = parse_document_str(coupon_yaml(), DocumentFormat::Yaml).unwrap();
    validate_document(&parsed.document).unwrap();
}

#[test]
fn parse_auto_detects_yaml() {
    let parsed = parse_document_str(coupon_yaml(), DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Yaml);
}

#[test]
fn parse_auto_detects_json() {
    let json = r##"{
      "formwatch": "1.0.0",
      "info": { "title": "t", "version": "1" },
      "journeys": [
        { "journeyId": "j1", "url": "https://example.com/",
          "steps": [ { "stepId": "s1",
                       "action": { "type": "click", "selector": "#go" },
                       "expectation": { "type": "element-visible", "selector": "#done" } } ] }
      ]
    }"##;
    let parsed = parse_document_str(json, DocumentFormat::Auto).unwrap();
    assert_eq!(parsed.format, DocumentFormat::Json);
    validate_document(&parsed.document).unwrap();
}

#[test]
fn actions_and_values_deserialize_as_tagged_variants() {
    let doc = parse_document_str(coupon_yaml(), DocumentFormat::Yaml)
        .unwrap()
        .document;
    let steps = &doc.journeys[0].steps;

    assert_eq!(
        steps[0].action,
        Action::SelectOption {
            selector: "#eRedeemRegion".to_string(),
            value: InputValue::Literal("na".to_string()),
        }
    );
    assert_eq!(
        steps[1].action.input(),
        Some(&InputValue::Secret {
            secret: "secrets://MEMBER_CODE".to_string()
        })
    );
    assert_eq!(
        steps[2].action.input(),
        Some(&InputValue::Generated {
            generate: GeneratorKind::Coupon
        })
    );
    assert_eq!(steps[4].action, Action::WaitOnly);
    assert_eq!(steps[4].action.selector(), None);
}

#[test]
fn expectations_carry_kind_and_source() {
    let doc = parse_document_str(coupon_yaml(), DocumentFormat::Yaml)
        .unwrap()
        .document;
    let steps = &doc.journeys[0].steps;

    assert_eq!(steps[0].expectation.kind(), ExpectationKind::ElementTextEquals);
    match &steps[4].expectation {
        Expectation::ElementTextEquals { source, .. } => assert_eq!(*source, TextSource::Html),
        other => panic!("unexpected expectation: {other:?}"),
    }
    match &steps[3].expectation {
        Expectation::ElementVisible { selector } => assert_eq!(selector, "#popAlert.pop.on"),
        other => panic!("unexpected expectation: {other:?}"),
    }
    assert_eq!(steps[5].expectation.kind(), ExpectationKind::ElementAbsent);
}

#[test]
fn settings_default_and_step_timeout_override() {
    let doc = parse_document_str(coupon_yaml(), DocumentFormat::Yaml)
        .unwrap()
        .document;
    let settings = &doc.settings;
    assert_eq!(settings.poll_interval(), Duration::from_millis(200));
    assert_eq!(settings.retries, 2);
    assert_eq!(settings.alert_cooldown_seconds, 3600);

    let steps = &doc.journeys[0].steps;
    assert_eq!(steps[0].timeout(settings), Duration::from_secs(10));
    assert_eq!(steps[3].timeout(settings), Duration::from_secs(12));
}

#[test]
fn validate_reports_duplicate_step_ids_and_bad_regex() {
    let yaml = r##"
formwatch: 1.0.0
info: { title: t, version: "1" }
journeys:
  - journeyId: j1
    url: https://example.com/
    steps:
      - stepId: s1
        action: { type: click, selector: "#a" }
        expectation: { type: element-text-matches-pattern, selector: "#b", pattern: "([" }
      - stepId: s1
        action: { type: fill-field, selector: "", value: x }
        expectation: { type: element-visible, selector: "#c" }
        timeoutMs: 0
"##;
    let doc = parse_document_str(yaml, DocumentFormat::Yaml).unwrap().document;
    let err = validate_document(&doc).unwrap_err();
    let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();

    assert!(paths.contains(&"$.journeys[0].steps[0].expectation.pattern"));
    assert!(paths.contains(&"$.journeys[0].steps[1].stepId"));
    assert!(paths.contains(&"$.journeys[0].steps[1].action.selector"));
    assert!(paths.contains(&"$.journeys[0].steps[1].timeoutMs"));
}

#[test]
fn validate_rejects_unsupported_version_and_bad_url() {
    let yaml = r##"
formwatch: 2.0.0
info: { title: t, version: "1" }
journeys:
  - journeyId: j1
    url: ftp://example.com/
    steps:
      - stepId: s1
        action: { type: wait-only }
        expectation: { type: element-visible, selector: "#c" }
"##;
    let doc = parse_document_str(yaml, DocumentFormat::Yaml).unwrap().document;
    let err = validate_document(&doc).unwrap_err();
    let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
    assert!(paths.contains(&"$.formwatch"));
    assert!(paths.contains(&"$.journeys[0].url"));
}

#[test]
fn validate_rejects_malformed_secret_refs_and_unknown_fields() {
    let yaml = r##"
formwatch: 1.0.0
info: { title: t, version: "1" }
journeys:
  - journeyId: j1
    url: https://example.com/
    retries: 3
    steps:
      - stepId: s1
        action: { type: fill-field, selector: "#m", value: { secret: "MEMBER_CODE" } }
        expectation: { type: element-visible, selector: "#m" }
"##;
    let doc = parse_document_str(yaml, DocumentFormat::Yaml).unwrap().document;
    let err = validate_document(&doc).unwrap_err();
    let paths: Vec<&str> = err.violations.iter().map(|v| v.path.as_str()).collect();
    assert!(paths.contains(&"$.journeys[0].retries"));
    assert!(paths.contains(&"$.journeys[0].steps[0].action.value.secret"));
}

#[test]
fn unknown_action_type_is_a_parse_error() {
    let yaml = r##"
formwatch: 1.0.0
info: { title: t, version: "1" }
journeys:
  - journeyId: j1
    url: https://example.com/
    steps:
      - stepId: s1
        action: { type: hover, selector: "#m" }
        expectation: { type: element-visible, selector: "#m" }
"##;
    assert!(parse_document_str(yaml, DocumentFormat::Yaml).is_err());
}
