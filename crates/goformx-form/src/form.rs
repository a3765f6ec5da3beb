//! # Form Definition
//!
//! The persisted record describing a form: metadata plus the field schema.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──▶ active = true
//!   │
//!   ├── update(title, description, schema)   no validation, refreshes updated_at
//!   ├── activate()                           any state → active
//!   └── deactivate()                         any state → inactive
//! ```
//!
//! Mutation never validates. Callers run [`FormValidator`](crate::FormValidator)
//! explicitly before persisting.

use goformx_core::{DomainError, ErrorCode, FormId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A form definition as stored in the `forms` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    id: FormId,
    #[serde(rename = "user_id")]
    owner_id: UserId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    schema: Option<Map<String, Value>>,
    #[serde(default = "default_active")]
    active: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

fn default_active() -> bool {
    true
}

impl FormDefinition {
    /// Create a new, active form owned by `owner_id`.
    pub fn new(
        owner_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        schema: Option<Map<String, Value>>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: FormId::new(),
            owner_id,
            title: title.into(),
            description: description.into(),
            schema,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> Option<&Map<String, Value>> {
        self.schema.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Replace title, description and schema.
    pub fn update(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        schema: Option<Map<String, Value>>,
    ) {
        self.title = title.into();
        self.description = description.into();
        self.schema = schema;
        self.touch();
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.touch();
    }

    /// Whether `user` owns this form.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    /// Require that `user` owns this form.
    pub fn authorize_owner(&self, user: UserId) -> Result<(), DomainError> {
        if self.is_owned_by(user) {
            return Ok(());
        }
        Err(
            DomainError::new(ErrorCode::FormAccessDenied, "you do not have access to this form")
                .with_context("form_id", self.id.to_string())
                .with_context("user_id", user.to_string()),
        )
    }

    /// Validate with the default rules. See [`FormValidator`](crate::FormValidator).
    pub fn validate(&self) -> Result<(), DomainError> {
        crate::validate::validate(self)
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// Untrusted form input, as posted by the builder UI or read from a file.
///
/// Every field is optional at the wire level so that absent values surface
/// as validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl FormDraft {
    /// Build a form record for `owner`. A `null` schema becomes an absent
    /// schema; any other non-object schema is rejected.
    pub fn into_form(self, owner: UserId) -> Result<FormDefinition, DomainError> {
        let schema = schema_object(self.schema)?;
        let mut form = FormDefinition::new(owner, self.title, self.description, schema);
        if self.active == Some(false) {
            form.deactivate();
        }
        Ok(form)
    }

    /// Apply this draft to an existing form.
    pub fn apply_to(self, form: &mut FormDefinition) -> Result<(), DomainError> {
        let schema = schema_object(self.schema)?;
        form.update(self.title, self.description, schema);
        match self.active {
            Some(true) => form.activate(),
            Some(false) => form.deactivate(),
            None => {}
        }
        Ok(())
    }
}

fn schema_object(schema: Option<Value>) -> Result<Option<Map<String, Value>>, DomainError> {
    match schema {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(DomainError::new(
            ErrorCode::ValidationInvalidInput,
            "form schema must be a JSON object",
        )
        .with_context("field", "schema")
        .with_context("found", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
