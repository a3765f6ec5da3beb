//! # Document Loading
//!
//! Reads form definitions and submissions from JSON or YAML files. YAML is
//! converted to the equivalent `serde_json::Value` tree so every downstream
//! check sees one representation.

use std::path::Path;

use goformx_core::{DomainError, ErrorCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// On-disk encoding of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess from the file extension. Anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Read and parse a document, choosing the format by extension.
pub fn load_document(path: &Path) -> Result<Value, DomainError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        let code = match e.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::ValidationInvalidInput,
        };
        DomainError::with_source(code, format!("cannot read {}", path.display()), e)
            .with_context("path", path.display().to_string())
    })?;
    parse_document(&content, DocumentFormat::from_path(path))
        .map_err(|e| e.with_context("path", path.display().to_string()))
}

/// Read a document and deserialize it into `T`.
pub fn load_as<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let value = load_document(path)?;
    serde_json::from_value(value).map_err(|e| {
        DomainError::with_source(
            ErrorCode::ValidationInvalidInput,
            format!("unexpected document structure in {}: {e}", path.display()),
            e,
        )
        .with_context("path", path.display().to_string())
    })
}

/// Parse document text in the given format.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, DomainError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| {
            DomainError::with_source(
                ErrorCode::ValidationInvalidFormat,
                format!("invalid JSON: {e}"),
                e,
            )
        }),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
                DomainError::with_source(
                    ErrorCode::ValidationInvalidFormat,
                    format!("invalid YAML: {e}"),
                    e,
                )
            })?;
            yaml_to_json_value(&yaml).map_err(|reason| {
                DomainError::new(
                    ErrorCode::ValidationInvalidFormat,
                    format!("YAML cannot be represented as JSON: {reason}"),
                )
            })
        }
    }
}

/// Convert a `serde_yaml::Value` into a `serde_json::Value`. Tags are
/// dropped; map keys must be scalars.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("non-finite number {f}"))
            } else {
                Err(format!("unsupported number {n:?}"))
            }
        }
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Mapping(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("map key {other:?} is not a scalar")),
                };
                out.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(out))
        }
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormDraft;
    use serde_json::json;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("form")), DocumentFormat::Json);
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let yaml = "title: Contact Us\nschema:\n  fields:\n    - type: email\n      required: true\n      max: 3\n";
        let from_yaml = parse_document(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(
            from_yaml,
            json!({ "title": "Contact Us", "schema": { "fields": [{ "type": "email", "required": true, "max": 3 }] } })
        );
    }

    #[test]
    fn test_invalid_json_is_invalid_format() {
        let err = parse_document("{ not json", DocumentFormat::Json).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalidFormat);
    }

    #[test]
    fn test_null_yaml_key_rejected() {
        let err = parse_document("~: 1\n", DocumentFormat::Yaml).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationInvalidFormat);
    }

    #[test]
    fn test_load_draft_from_yaml_file() {
        let file = write_temp(".yaml", "title: Survey\ndescription: quick\nschema: null\n");
        let draft: FormDraft = load_as(file.path()).unwrap();
        assert_eq!(draft.title, "Survey");
        assert_eq!(draft.schema, None);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_document(Path::new("/nonexistent/goformx/form.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(err.context_value("path").is_some());
    }
}
