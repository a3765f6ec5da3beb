//! # Form Submissions
//!
//! A [`FormSubmission`] is one respondent's answers to a form. Its
//! processing status moves through a small state machine:
//!
//! ```text
//! Pending ──▶ Processing ──▶ Completed
//!    ▲             │
//!    │             ▼
//!    └────────── Failed
//! ```
//!
//! [`SubmissionValidator`] checks submitted data against the form it
//! targets. Fields-array forms are checked field by field; JSON Schema forms
//! with `properties` are evaluated with the `jsonschema` crate (Draft
//! 2020-12). Schemas that only carry `components` impose no data rules.

use std::fmt;

use goformx_core::{DomainError, ErrorCode, FormId, Sentinel, SubmissionId, Timestamp};
use jsonschema::{Retrieve, Uri};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::form::FormDefinition;
use crate::shape::{SchemaDialect, ShapeKind};

// ─── Status ──────────────────────────────────────────────────────────

/// Processing status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl SubmissionStatus {
    /// Whether the state machine permits `self → to`.
    pub fn can_transition_to(&self, to: SubmissionStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }

    /// `Completed` accepts no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Entity ──────────────────────────────────────────────────────────

/// One set of answers to a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    id: SubmissionId,
    form_id: FormId,
    data: Map<String, Value>,
    submitted_at: Timestamp,
    #[serde(default)]
    status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    metadata: Map<String, Value>,
}

impl FormSubmission {
    /// A new pending submission for `form_id`.
    pub fn new(form_id: FormId, data: Map<String, Value>) -> Self {
        Self {
            id: SubmissionId::new(),
            form_id,
            data,
            submitted_at: Timestamp::now(),
            status: SubmissionStatus::Pending,
            metadata: Map::new(),
        }
    }

    /// Attach client metadata (user agent, referrer, ...).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> SubmissionId {
        self.id
    }

    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn submitted_at(&self) -> Timestamp {
        self.submitted_at
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Move to `to`, rejecting transitions the state machine does not allow.
    pub fn transition(&mut self, to: SubmissionStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(to) {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                format!("cannot move submission from {} to {}", self.status, to),
            )
            .with_context("submission_id", self.id.to_string())
            .with_context("from", self.status.as_str())
            .with_context("to", to.as_str()));
        }
        self.status = to;
        Ok(())
    }
}

// ─── Field Errors ────────────────────────────────────────────────────

/// A problem with one answer in a fields-array submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionShapeError {
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("field '{field}' is required")]
    MissingRequired { field: String },

    #[error("field '{field}' must be a number")]
    NotANumber { field: String },

    #[error("field '{field}' must be an email address")]
    InvalidEmail { field: String },

    #[error("field '{field}' must be one of the listed options")]
    NotAnOption { field: String },

    #[error("field '{field}' must be a boolean or a list of option values")]
    InvalidCheckbox { field: String },
}

impl SubmissionShapeError {
    pub fn field(&self) -> &str {
        match self {
            Self::UnknownField { field }
            | Self::MissingRequired { field }
            | Self::NotANumber { field }
            | Self::InvalidEmail { field }
            | Self::NotAnOption { field }
            | Self::InvalidCheckbox { field } => field,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownField { .. } => ErrorCode::ValidationInvalidInput,
            Self::MissingRequired { .. } => ErrorCode::ValidationRequired,
            Self::InvalidEmail { .. } => ErrorCode::ValidationInvalidFormat,
            Self::NotANumber { .. } | Self::NotAnOption { .. } | Self::InvalidCheckbox { .. } => {
                ErrorCode::ValidationInvalid
            }
        }
    }

    pub fn into_domain_error(self) -> DomainError {
        let field = self.field().to_string();
        let message = self.to_string();
        DomainError::with_source(self.code(), message, self).with_context("field", field)
    }
}

/// One JSON Schema violation in submitted data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub instance_path: String,
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

// ─── Validator ───────────────────────────────────────────────────────

/// Checks submitted data against the form it targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionValidator {
    dialect: SchemaDialect,
}

impl SubmissionValidator {
    pub fn new(dialect: SchemaDialect) -> Self {
        Self { dialect }
    }

    /// Validate `submission` against `form`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// - `FORM_NOT_FOUND` when the submission targets another form.
    /// - `FORM_SUBMISSION` when the form is inactive.
    /// - `FORM_INVALID` when the form's own schema is absent or malformed.
    /// - `VALIDATION_*` codes for problems in the submitted data.
    pub fn validate(
        &self,
        form: &FormDefinition,
        submission: &FormSubmission,
    ) -> Result<(), DomainError> {
        let result = self.first_failure(form, submission);
        match &result {
            Ok(()) => tracing::debug!(
                form_id = %form.id(),
                submission_id = %submission.id(),
                "submission accepted"
            ),
            Err(err) => tracing::debug!(
                form_id = %form.id(),
                submission_id = %submission.id(),
                code = %err.code(),
                error = %err.message(),
                "submission rejected"
            ),
        }
        result
    }

    fn first_failure(
        &self,
        form: &FormDefinition,
        submission: &FormSubmission,
    ) -> Result<(), DomainError> {
        if submission.form_id() != form.id() {
            return Err(DomainError::new(
                ErrorCode::FormNotFound,
                "submission does not belong to this form",
            )
            .with_context("form_id", form.id().to_string())
            .with_context("submission_form_id", submission.form_id().to_string()));
        }
        if !form.is_active() {
            return Err(DomainError::new(
                ErrorCode::FormSubmission,
                "form is not accepting submissions",
            )
            .with_context("form_id", form.id().to_string())
            .with_context("reason", "inactive"));
        }
        if submission.data().is_empty() {
            return Err(
                DomainError::new(ErrorCode::ValidationRequired, "submission data is required")
                    .with_context("field", "data"),
            );
        }

        let schema = form.schema().ok_or_else(|| Sentinel::SchemaRequired.error())?;
        let shape = self.dialect.resolve(schema);
        shape.check(schema).map_err(|e| {
            DomainError::wrap(
                e.into_domain_error(),
                ErrorCode::FormInvalid,
                "form schema is malformed",
            )
        })?;

        match self.dialect.detect(schema) {
            ShapeKind::FieldsArray => check_fields(schema, submission.data())
                .map_err(SubmissionShapeError::into_domain_error),
            ShapeKind::JsonSchema => check_json_schema(schema, submission.data()),
        }
    }
}

// ─── Fields Array Rules ──────────────────────────────────────────────

fn check_fields(
    schema: &Map<String, Value>,
    data: &Map<String, Value>,
) -> Result<(), SubmissionShapeError> {
    let fields: Vec<&Map<String, Value>> = schema
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default();

    let name_of = |field: &Map<String, Value>| -> String {
        field
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    for key in data.keys() {
        if !fields.iter().any(|field| name_of(field) == *key) {
            return Err(SubmissionShapeError::UnknownField { field: key.clone() });
        }
    }

    for field in &fields {
        let name = name_of(field);
        let answer = data.get(&name).filter(|v| !v.is_null());
        let Some(answer) = answer else {
            if field.get("required").and_then(Value::as_bool) == Some(true) {
                return Err(SubmissionShapeError::MissingRequired { field: name });
            }
            continue;
        };
        check_answer(field, name, answer)?;
    }
    Ok(())
}

fn check_answer(
    field: &Map<String, Value>,
    name: String,
    answer: &Value,
) -> Result<(), SubmissionShapeError> {
    let options = || -> Vec<&Value> {
        field
            .get("options")
            .and_then(Value::as_array)
            .map(|opts| opts.iter().filter_map(|o| o.get("value")).collect())
            .unwrap_or_default()
    };

    match field.get("type").and_then(Value::as_str).unwrap_or_default() {
        "number" if !answer.is_number() => Err(SubmissionShapeError::NotANumber { field: name }),
        "email" if !answer.as_str().is_some_and(looks_like_email) => {
            Err(SubmissionShapeError::InvalidEmail { field: name })
        }
        "select" | "radio" if !options().contains(&answer) => {
            Err(SubmissionShapeError::NotAnOption { field: name })
        }
        "checkbox" => match answer {
            Value::Bool(_) => Ok(()),
            Value::Array(values) if values.iter().all(|v| options().contains(&v)) => Ok(()),
            _ => Err(SubmissionShapeError::InvalidCheckbox { field: name }),
        },
        _ => Ok(()),
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// ─── JSON Schema Rules ───────────────────────────────────────────────

/// Refuses every external `$ref`; form schemas must be self-contained.
struct NoRemoteRetriever;

impl Retrieve for NoRemoteRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference {} is not allowed", uri.as_str()).into())
    }
}

fn check_json_schema(
    schema: &Map<String, Value>,
    data: &Map<String, Value>,
) -> Result<(), DomainError> {
    if !schema.contains_key("properties") {
        return Ok(());
    }

    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.with_retriever(NoRemoteRetriever);
    let validator = opts
        .build(&Value::Object(schema.clone()))
        .map_err(|e| {
            DomainError::new(
                ErrorCode::FormInvalid,
                format!("form schema cannot be compiled: {e}"),
            )
        })?;

    let instance = Value::Object(data.clone());
    let violations: Vec<Violation> = validator
        .iter_errors(&instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        return Ok(());
    }
    let message = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    let details: Vec<Value> = violations
        .iter()
        .filter_map(|v| serde_json::to_value(v).ok())
        .collect();
    Err(DomainError::new(
        ErrorCode::ValidationInvalidInput,
        format!("submission does not match form schema: {message}"),
    )
    .with_context("violations", details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use goformx_core::UserId;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn survey() -> FormDefinition {
        let schema = obj(json!({
            "title": "Survey",
            "description": "",
            "fields": [
                { "type": "text", "name": "name", "label": "Name", "required": true },
                { "type": "email", "name": "email", "label": "Email" },
                { "type": "number", "name": "age", "label": "Age" },
                { "type": "select", "name": "plan", "label": "Plan",
                  "options": [{ "label": "Free", "value": "free" }, { "label": "Pro", "value": "pro" }] },
                { "type": "checkbox", "name": "topics", "label": "Topics",
                  "options": [{ "label": "Rust", "value": "rust" }, { "label": "Go", "value": "go" }] }
            ]
        }));
        FormDefinition::new(UserId::new(), "Survey", "", Some(schema))
    }

    fn submit(form: &FormDefinition, data: Value) -> Result<(), DomainError> {
        let submission = FormSubmission::new(form.id(), obj(data));
        SubmissionValidator::default().validate(form, &submission)
    }

    // ── status ───────────────────────────────────────────────────────

    #[test]
    fn test_status_happy_path() {
        let mut s = FormSubmission::new(FormId::new(), obj(json!({ "a": 1 })));
        assert_eq!(s.status(), SubmissionStatus::Pending);
        s.transition(SubmissionStatus::Processing).unwrap();
        s.transition(SubmissionStatus::Completed).unwrap();
        assert!(s.status().is_terminal());
    }

    #[test]
    fn test_failed_can_retry() {
        let mut s = FormSubmission::new(FormId::new(), obj(json!({ "a": 1 })));
        s.transition(SubmissionStatus::Processing).unwrap();
        s.transition(SubmissionStatus::Failed).unwrap();
        s.transition(SubmissionStatus::Pending).unwrap();
        assert_eq!(s.status(), SubmissionStatus::Pending);
    }

    #[test]
    fn test_invalid_transition_is_conflict() {
        let mut s = FormSubmission::new(FormId::new(), obj(json!({ "a": 1 })));
        let err = s.transition(SubmissionStatus::Completed).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.context_value("from"), Some(&json!("pending")));
        assert_eq!(err.context_value("to"), Some(&json!("completed")));
        assert_eq!(s.status(), SubmissionStatus::Pending);
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(serde_json::to_value(SubmissionStatus::Processing).unwrap(), json!("processing"));
    }

    #[test]
    fn test_metadata_skipped_when_empty() {
        let s = FormSubmission::new(FormId::new(), obj(json!({ "a": 1 })));
        assert!(serde_json::to_value(&s).unwrap().get("metadata").is_none());
        let s = s.with_metadata("user_agent", "curl/8");
        assert_eq!(s.metadata().get("user_agent"), Some(&json!("curl/8")));
    }

    // ── fields array ─────────────────────────────────────────────────

    #[test]
    fn test_valid_submission() {
        let form = survey();
        let result = submit(
            &form,
            json!({ "name": "Ada", "email": "ada@example.com", "age": 36, "plan": "pro", "topics": ["rust"] }),
        );
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_wrong_form_is_not_found() {
        let form = survey();
        let submission = FormSubmission::new(FormId::new(), obj(json!({ "name": "Ada" })));
        let err = SubmissionValidator::default().validate(&form, &submission).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FormNotFound);
    }

    #[test]
    fn test_inactive_form_rejects() {
        let mut form = survey();
        form.deactivate();
        let err = submit(&form, json!({ "name": "Ada" })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FormSubmission);
        assert_eq!(err.context_value("reason"), Some(&json!("inactive")));
    }

    #[test]
    fn test_empty_data_required() {
        let err = submit(&survey(), json!({})).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationRequired);
    }

    #[test]
    fn test_unknown_key() {
        let err = submit(&survey(), json!({ "name": "Ada", "phone": "555" })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalidInput);
        assert_eq!(err.context_value("field"), Some(&json!("phone")));
    }

    #[test]
    fn test_required_field_missing() {
        let err = submit(&survey(), json!({ "email": "ada@example.com" })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationRequired);
        assert_eq!(err.context_value("field"), Some(&json!("name")));
    }

    #[test]
    fn test_number_field() {
        let err = submit(&survey(), json!({ "name": "Ada", "age": "36" })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalid);
    }

    #[test]
    fn test_email_field() {
        for bad in ["ada", "ada@", "@example.com", "ada@example", "a b@example.com", "a@b@c.com"] {
            let err = submit(&survey(), json!({ "name": "Ada", "email": bad })).unwrap_err();
            assert_eq!(err.code(), ErrorCode::ValidationInvalidFormat, "{bad}");
        }
    }

    #[test]
    fn test_select_value_must_be_option() {
        let err = submit(&survey(), json!({ "name": "Ada", "plan": "enterprise" })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalid);
    }

    #[test]
    fn test_checkbox_values() {
        assert!(submit(&survey(), json!({ "name": "Ada", "topics": true })).is_ok());
        assert!(submit(&survey(), json!({ "name": "Ada", "topics": ["rust", "go"] })).is_ok());
        let err = submit(&survey(), json!({ "name": "Ada", "topics": ["cobol"] })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalid);
        let err = submit(&survey(), json!({ "name": "Ada", "topics": "rust" })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalid);
    }

    #[test]
    fn test_field_error_keeps_source() {
        let err = submit(&survey(), json!({ "name": "Ada", "age": "x" })).unwrap_err();
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(
            source.downcast_ref::<SubmissionShapeError>(),
            Some(&SubmissionShapeError::NotANumber { field: "age".into() })
        );
    }

    #[test]
    fn test_malformed_form_schema_is_form_invalid() {
        let schema = obj(json!({ "title": "t", "description": "d", "fields": [{ "type": "text" }] }));
        let form = FormDefinition::new(UserId::new(), "Broken", "", Some(schema));
        let err = submit(&form, json!({ "x": 1 })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FormInvalid);
        assert_eq!(err.context_value("path"), Some(&json!("/fields/0/name")));
    }

    // ── JSON schema ──────────────────────────────────────────────────

    fn profile() -> FormDefinition {
        let schema = obj(json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "age": { "type": "integer", "minimum": 0 }
            },
            "required": ["name"]
        }));
        FormDefinition::new(UserId::new(), "Profile", "", Some(schema))
    }

    #[test]
    fn test_json_schema_valid() {
        assert!(submit(&profile(), json!({ "name": "Ada", "age": 36 })).is_ok());
    }

    #[test]
    fn test_json_schema_violations_collected() {
        let err = submit(&profile(), json!({ "age": -1 })).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalidInput);
        let violations = err.context_value("violations").unwrap().as_array().unwrap();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v["instance_path"] == json!("/age")));
    }

    #[test]
    fn test_components_only_schema_accepts_any_data() {
        let schema = obj(json!({ "type": "object", "components": [{ "key": "name" }] }));
        let form = FormDefinition::new(UserId::new(), "Builder", "", Some(schema));
        assert!(submit(&form, json!({ "anything": [1, 2, 3] })).is_ok());
    }
}
