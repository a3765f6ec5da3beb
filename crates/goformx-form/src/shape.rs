//! # Schema Shapes
//!
//! A form schema is stored in one of two historical shapes:
//!
//! - **Fields array** ([`FieldsArrayShape`]): `{ "fields": [...], "title", "description" }`
//!   where every field carries `type`, `name` and `label`, and choice fields
//!   (`select`, `radio`, `checkbox`) carry a non-empty `options` list.
//! - **JSON Schema** ([`JsonSchemaShape`]): `{ "type": "object", "properties": {...} }`
//!   or `{ "type": "object", "components": [...] }`.
//!
//! Both are exposed as [`SchemaShape`] strategies. [`SchemaDialect`] selects
//! one explicitly or, with `Auto`, by inspecting the document root.
//!
//! Strategies report every violation they find via
//! [`SchemaShape::violations`], in document order. The fail-fast
//! [`SchemaShape::check`] returns the first of them.

use std::fmt;
use std::str::FromStr;

use goformx_core::{DomainError, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field types accepted by the fields-array shape.
pub const FIELD_TYPES: [&str; 12] = [
    "text", "textarea", "number", "email", "select", "checkbox", "radio", "date", "password",
    "time", "datetime", "file",
];

/// Field types that must carry an `options` list.
pub const CHOICE_FIELD_TYPES: [&str; 3] = ["select", "radio", "checkbox"];

/// Property types accepted by the JSON Schema shape.
pub const PROPERTY_TYPES: [&str; 6] = ["string", "number", "integer", "boolean", "array", "object"];

const FIELDS_ROOT_KEYS: [&str; 3] = ["fields", "title", "description"];
const FIELD_KEYS: [&str; 3] = ["type", "name", "label"];
const OPTION_KEYS: [&str; 2] = ["label", "value"];

// ─── Errors ──────────────────────────────────────────────────────────

/// A structural problem in a form schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaShapeError {
    #[error("schema is missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("schema key '{key}' must be {expected}")]
    WrongKeyType {
        key: &'static str,
        expected: &'static str,
    },

    #[error("field {index} must be an object")]
    FieldNotObject { index: usize },

    #[error("field {index} is missing required key '{key}'")]
    FieldMissingKey { index: usize, key: &'static str },

    #[error("field {index} key '{key}' must be a string")]
    FieldKeyNotString { index: usize, key: &'static str },

    #[error("field {index} has unsupported type '{field_type}'")]
    UnknownFieldType { index: usize, field_type: String },

    #[error("field {index} of type '{field_type}' requires an options array")]
    MissingOptions { index: usize, field_type: String },

    #[error("field {index} of type '{field_type}' must have at least one option")]
    EmptyOptions { index: usize, field_type: String },

    #[error("option {option} of field {index} must be an object")]
    OptionNotObject { index: usize, option: usize },

    #[error("option {option} of field {index} is missing '{key}'")]
    OptionMissingKey {
        index: usize,
        option: usize,
        key: &'static str,
    },

    #[error("schema root type must be \"object\", found {found}")]
    RootTypeNotObject { found: String },

    #[error("schema must define either 'properties' or 'components'")]
    MissingPropertiesOrComponents,

    #[error("property '{property}' must be an object")]
    PropertyNotObject { property: String },

    #[error("property '{property}' is missing a type")]
    PropertyMissingType { property: String },

    #[error("property '{property}' has unsupported type {found}")]
    UnknownPropertyType { property: String, found: String },
}

impl SchemaShapeError {
    /// JSON Pointer to the offending location within the schema document.
    pub fn path(&self) -> String {
        match self {
            Self::MissingKey { key } | Self::WrongKeyType { key, .. } => format!("/{key}"),
            Self::FieldNotObject { index } | Self::UnknownFieldType { index, .. } => {
                format!("/fields/{index}")
            }
            Self::FieldMissingKey { index, key } | Self::FieldKeyNotString { index, key } => {
                format!("/fields/{index}/{key}")
            }
            Self::MissingOptions { index, .. } | Self::EmptyOptions { index, .. } => {
                format!("/fields/{index}/options")
            }
            Self::OptionNotObject { index, option } => {
                format!("/fields/{index}/options/{option}")
            }
            Self::OptionMissingKey { index, option, key } => {
                format!("/fields/{index}/options/{option}/{key}")
            }
            Self::RootTypeNotObject { .. } => "/type".to_string(),
            Self::MissingPropertiesOrComponents => String::new(),
            Self::PropertyNotObject { property } => {
                format!("/properties/{}", escape_pointer(property))
            }
            Self::PropertyMissingType { property } | Self::UnknownPropertyType { property, .. } => {
                format!("/properties/{}/type", escape_pointer(property))
            }
        }
    }

    /// Copy this error's location into a domain error's context map.
    pub fn annotate(&self, mut err: DomainError) -> DomainError {
        err.insert_context("path", self.path());
        match self {
            Self::FieldNotObject { index }
            | Self::FieldMissingKey { index, .. }
            | Self::FieldKeyNotString { index, .. }
            | Self::UnknownFieldType { index, .. }
            | Self::MissingOptions { index, .. }
            | Self::EmptyOptions { index, .. } => {
                err.insert_context("field_index", *index);
            }
            Self::OptionNotObject { index, option } | Self::OptionMissingKey { index, option, .. } => {
                err.insert_context("field_index", *index);
                err.insert_context("option_index", *option);
            }
            Self::PropertyNotObject { property }
            | Self::PropertyMissingType { property }
            | Self::UnknownPropertyType { property, .. } => {
                err.insert_context("property", property.clone());
            }
            Self::MissingKey { .. }
            | Self::WrongKeyType { .. }
            | Self::RootTypeNotObject { .. }
            | Self::MissingPropertiesOrComponents => {}
        }
        err
    }

    /// Surface this structural failure as a generic validation error. The
    /// shape error stays reachable through `source()`.
    pub fn into_domain_error(self) -> DomainError {
        let message = format!("invalid form schema: {self}");
        let location = self.clone();
        location.annotate(DomainError::wrap(self, ErrorCode::Validation, message))
    }
}

/// RFC 6901 escaping for a single pointer segment.
fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Render a JSON value for an error message, naming absent values.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

// ─── Strategy Trait ──────────────────────────────────────────────────

/// A structural rule set for form schemas.
pub trait SchemaShape: Send + Sync + fmt::Debug {
    /// Short name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Every violation in the schema, in document order.
    fn violations(&self, schema: &Map<String, Value>) -> Vec<SchemaShapeError>;

    /// The first violation, if any.
    fn check(&self, schema: &Map<String, Value>) -> Result<(), SchemaShapeError> {
        match self.violations(schema).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ─── Fields Array ────────────────────────────────────────────────────

/// The `fields`-array schema shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldsArrayShape;

impl FieldsArrayShape {
    fn field_violations(index: usize, field: &Value, out: &mut Vec<SchemaShapeError>) {
        let Some(field) = field.as_object() else {
            out.push(SchemaShapeError::FieldNotObject { index });
            return;
        };

        for key in FIELD_KEYS {
            match field.get(key) {
                None => out.push(SchemaShapeError::FieldMissingKey { index, key }),
                Some(Value::String(_)) => {}
                Some(_) => out.push(SchemaShapeError::FieldKeyNotString { index, key }),
            }
        }

        let Some(field_type) = field.get("type").and_then(Value::as_str) else {
            return;
        };
        if !FIELD_TYPES.contains(&field_type) {
            out.push(SchemaShapeError::UnknownFieldType {
                index,
                field_type: field_type.to_string(),
            });
            return;
        }
        if !CHOICE_FIELD_TYPES.contains(&field_type) {
            return;
        }

        let options = match field.get("options") {
            Some(Value::Array(options)) => options,
            _ => {
                out.push(SchemaShapeError::MissingOptions {
                    index,
                    field_type: field_type.to_string(),
                });
                return;
            }
        };
        if options.is_empty() {
            out.push(SchemaShapeError::EmptyOptions {
                index,
                field_type: field_type.to_string(),
            });
            return;
        }
        for (option, value) in options.iter().enumerate() {
            let Some(value) = value.as_object() else {
                out.push(SchemaShapeError::OptionNotObject { index, option });
                continue;
            };
            for key in OPTION_KEYS {
                if !value.contains_key(key) {
                    out.push(SchemaShapeError::OptionMissingKey { index, option, key });
                }
            }
        }
    }
}

impl SchemaShape for FieldsArrayShape {
    fn name(&self) -> &'static str {
        "fields"
    }

    fn violations(&self, schema: &Map<String, Value>) -> Vec<SchemaShapeError> {
        let mut out = Vec::new();
        for key in FIELDS_ROOT_KEYS {
            if !schema.contains_key(key) {
                out.push(SchemaShapeError::MissingKey { key });
            }
        }

        match schema.get("fields") {
            None => {}
            Some(Value::Array(fields)) => {
                for (index, field) in fields.iter().enumerate() {
                    Self::field_violations(index, field, &mut out);
                }
            }
            Some(_) => out.push(SchemaShapeError::WrongKeyType {
                key: "fields",
                expected: "an array",
            }),
        }
        out
    }
}

// ─── JSON Schema ─────────────────────────────────────────────────────

/// The JSON-Schema-like `properties`/`components` shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaShape;

impl SchemaShape for JsonSchemaShape {
    fn name(&self) -> &'static str {
        "json-schema"
    }

    fn violations(&self, schema: &Map<String, Value>) -> Vec<SchemaShapeError> {
        let mut out = Vec::new();
        match schema.get("type") {
            None => out.push(SchemaShapeError::MissingKey { key: "type" }),
            Some(Value::String(t)) if t == "object" => {}
            Some(other) => out.push(SchemaShapeError::RootTypeNotObject {
                found: describe(other),
            }),
        }

        match (schema.get("properties"), schema.get("components")) {
            (Some(Value::Object(properties)), _) => {
                for (property, definition) in properties {
                    let Some(definition) = definition.as_object() else {
                        out.push(SchemaShapeError::PropertyNotObject {
                            property: property.clone(),
                        });
                        continue;
                    };
                    match definition.get("type") {
                        None => out.push(SchemaShapeError::PropertyMissingType {
                            property: property.clone(),
                        }),
                        Some(Value::String(t)) if PROPERTY_TYPES.contains(&t.as_str()) => {}
                        Some(other) => out.push(SchemaShapeError::UnknownPropertyType {
                            property: property.clone(),
                            found: describe(other),
                        }),
                    }
                }
            }
            (Some(_), _) => out.push(SchemaShapeError::WrongKeyType {
                key: "properties",
                expected: "an object",
            }),
            (None, Some(Value::Array(_))) => {}
            (None, Some(_)) => out.push(SchemaShapeError::WrongKeyType {
                key: "components",
                expected: "an array",
            }),
            (None, None) => out.push(SchemaShapeError::MissingPropertiesOrComponents),
        }
        out
    }
}

// ─── Dialect ─────────────────────────────────────────────────────────

static FIELDS_ARRAY: FieldsArrayShape = FieldsArrayShape;
static JSON_SCHEMA: JsonSchemaShape = JsonSchemaShape;

/// Which schema shape a validator enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaDialect {
    /// Always the fields-array shape.
    #[serde(rename = "fields")]
    FieldsArray,
    /// Always the JSON Schema shape.
    JsonSchema,
    /// Fields-array when the root has a `fields` key, JSON Schema otherwise.
    #[default]
    Auto,
}

/// The concrete shape a schema is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    FieldsArray,
    JsonSchema,
}

impl SchemaDialect {
    /// Decide the concrete shape for a schema document.
    pub fn detect(&self, schema: &Map<String, Value>) -> ShapeKind {
        match self {
            Self::FieldsArray => ShapeKind::FieldsArray,
            Self::JsonSchema => ShapeKind::JsonSchema,
            Self::Auto if schema.contains_key("fields") => ShapeKind::FieldsArray,
            Self::Auto => ShapeKind::JsonSchema,
        }
    }

    /// The strategy that applies to a schema document.
    pub fn resolve(&self, schema: &Map<String, Value>) -> &'static dyn SchemaShape {
        match self.detect(schema) {
            ShapeKind::FieldsArray => &FIELDS_ARRAY,
            ShapeKind::JsonSchema => &JSON_SCHEMA,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FieldsArray => "fields",
            Self::JsonSchema => "json-schema",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for SchemaDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaDialect {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fields" | "fields-array" => Ok(Self::FieldsArray),
            "json-schema" | "jsonschema" => Ok(Self::JsonSchema),
            "auto" | "" => Ok(Self::Auto),
            other => Err(DomainError::new(
                ErrorCode::ValidationInvalidInput,
                format!("unknown schema dialect {other:?}; expected fields, json-schema or auto"),
            )),
        }
    }
}
