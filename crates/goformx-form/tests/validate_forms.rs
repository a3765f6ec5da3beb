//! Integration tests: form definition and submission validation end to end,
//! including the fixture documents under `forms/`.

use std::path::PathBuf;

use goformx_core::{is_validation, DomainError, ErrorCode, Sentinel, UserId};
use goformx_form::{
    load_as, FormDefinition, FormDraft, FormSubmission, FormValidator, SchemaDialect,
    SubmissionValidator, ValidatorConfig,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn fixture(name: &str) -> PathBuf {
    repo_root().join("forms").join(name)
}

fn load_form(name: &str) -> FormDefinition {
    let draft: FormDraft = load_as(&fixture(name)).unwrap();
    draft.into_form(UserId::new()).unwrap()
}

fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn minimal_schema() -> Map<String, Value> {
    obj(json!({
        "title": "t",
        "description": "d",
        "fields": [{ "type": "text", "name": "n", "label": "L" }]
    }))
}

fn form_with(title: &str, description: &str) -> FormDefinition {
    FormDefinition::new(UserId::new(), title, description, Some(minimal_schema()))
}

// ── fixtures ─────────────────────────────────────────────────────────

#[test]
fn fixture_forms_are_valid() {
    for name in ["contact-us.json", "feedback.yaml", "profile.json"] {
        let form = load_form(name);
        assert!(form.validate().is_ok(), "{name}: {:?}", form.validate());
    }
}

#[test]
fn fixture_missing_label_reports_both_problems() {
    let form = load_form("invalid/missing-label.json");
    let err = form.validate().unwrap_err();
    assert_eq!(err.context_value("path"), Some(&json!("/fields/0/label")));

    let report = FormValidator::default().validate_all(&form).unwrap_err();
    assert_eq!(report.len(), 2);
    assert_eq!(
        report.errors()[1].context_value("path"),
        Some(&json!("/fields/1/options"))
    );
}

#[test]
fn fixture_short_title() {
    let err = load_form("invalid/short-title.yaml").validate().unwrap_err();
    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(err.context_value("field"), Some(&json!("title")));
}

#[test]
fn fixture_submissions() {
    let validator = SubmissionValidator::default();
    let cases = [
        ("feedback.yaml", "submissions/feedback.yaml", None),
        ("feedback.yaml", "submissions/feedback-bad-option.yaml", Some(ErrorCode::ValidationInvalid)),
        ("profile.json", "submissions/profile.json", None),
        (
            "profile.json",
            "submissions/profile-negative-years.json",
            Some(ErrorCode::ValidationInvalidInput),
        ),
    ];
    for (form_file, data_file, expected) in cases {
        let form = load_form(form_file);
        let data: Map<String, Value> = load_as(&fixture(data_file)).unwrap();
        let submission = FormSubmission::new(form.id(), data);
        let result = validator.validate(&form, &submission);
        assert_eq!(result.err().map(|e| e.code()), expected, "{data_file}");
    }
}

// ── scenarios ────────────────────────────────────────────────────────

#[test]
fn contact_us_with_email_field_passes() {
    let schema = obj(json!({
        "title": "Contact Us",
        "description": "",
        "fields": [{ "type": "email", "name": "email", "label": "Email" }]
    }));
    let form = FormDefinition::new(UserId::new(), "Contact Us", "", Some(schema));
    assert!(goformx_form::validate(&form).is_ok());
}

#[test]
fn title_hi_fails_and_cites_bound() {
    let err = goformx_form::validate(&form_with("Hi", "")).unwrap_err();
    assert!(is_validation(&err));
    assert!(err.message().contains("at least 3"));
}

#[test]
fn sentinels_distinguish_missing_title_and_schema() {
    let no_title = goformx_form::validate(&form_with("", "")).unwrap_err();
    assert!(no_title.is(Sentinel::TitleRequired));
    assert!(!no_title.is(Sentinel::SchemaRequired));

    let no_schema =
        goformx_form::validate(&FormDefinition::new(UserId::new(), "Survey", "", None)).unwrap_err();
    assert!(no_schema.is(Sentinel::SchemaRequired));
}

#[test]
fn json_schema_root_and_property_rules() {
    let check = |schema: Value| {
        goformx_form::validate(&FormDefinition::new(
            UserId::new(),
            "Survey",
            "",
            Some(obj(schema)),
        ))
    };
    assert!(check(json!({ "type": "object", "properties": { "age": { "type": "integer" } } })).is_ok());
    assert!(check(json!({ "type": "object", "components": [] })).is_ok());
    assert!(check(json!({ "type": "object" })).is_err());
    assert!(check(json!({ "type": "string", "properties": {} })).is_err());
    assert!(check(json!({ "type": "object", "properties": { "age": { "type": "uuid" } } })).is_err());
}

#[test]
fn validator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FormValidator>();
    assert_send_sync::<SubmissionValidator>();

    let validator = FormValidator::new(ValidatorConfig {
        dialect: SchemaDialect::FieldsArray,
        ..ValidatorConfig::default()
    });
    let form = form_with("Survey", "");
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| assert!(validator.validate(&form).is_ok()));
        }
    });
}

#[test]
fn report_converts_for_transport() {
    let form = FormDefinition::new(UserId::new(), "", &"x".repeat(501), None);
    let report = FormValidator::default().validate_all(&form).unwrap_err();
    let err: DomainError = report.into();
    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(
        err.context_value("errors").and_then(Value::as_array).map(Vec::len),
        Some(3)
    );
}

// ── properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn title_length_bounds(len in 1usize..=150) {
        let result = goformx_form::validate(&form_with(&"a".repeat(len), ""));
        prop_assert_eq!(result.is_ok(), (3..=100).contains(&len));
    }

    #[test]
    fn description_length_bound(len in 0usize..=700) {
        let result = goformx_form::validate(&form_with("Survey", &"d".repeat(len)));
        prop_assert_eq!(result.is_ok(), len <= 500);
    }

    #[test]
    fn multibyte_titles_count_characters(len in 3usize..=100) {
        let title: String = std::iter::repeat('ß').take(len).collect();
        prop_assert!(goformx_form::validate(&form_with(&title, "")).is_ok());
    }

    #[test]
    fn validation_is_idempotent(title in ".{0,120}", description in ".{0,520}") {
        let form = form_with(&title, &description);
        let first = goformx_form::validate(&form).map_err(|e| (e.code(), e.message().to_string()));
        let second = goformx_form::validate(&form).map_err(|e| (e.code(), e.message().to_string()));
        prop_assert_eq!(first, second);
    }
}
