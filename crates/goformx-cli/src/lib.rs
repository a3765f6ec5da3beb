//! # goformx-cli — Form Validation from the Command Line
//!
//! ## Subcommands
//!
//! - `validate`: check a form definition file (JSON or YAML)
//! - `submission`: check a submission file against a form definition file
//!
//! ## Exit Status
//!
//! `0` when the document is valid, `1` when it fails validation, `2` when it
//! cannot be read or parsed.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `goformx-form`; no validation rules live here.

use std::path::Path;

use goformx_core::DomainError;
use serde::Serialize;
use serde_json::Value;

pub mod submission;
pub mod validate;

/// Machine-readable outcome printed with `--json`.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub file: String,
    pub valid: bool,
    pub errors: Vec<ErrorEntry>,
}

/// One failure inside an [`Outcome`].
#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub context: serde_json::Map<String, Value>,
}

impl From<&DomainError> for ErrorEntry {
    fn from(err: &DomainError) -> Self {
        Self {
            code: err.code().as_str().to_string(),
            message: err.message().to_string(),
            context: err
                .context()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl Outcome {
    pub fn new(file: &Path, errors: &[DomainError]) -> Self {
        Self {
            file: file.display().to_string(),
            valid: errors.is_empty(),
            errors: errors.iter().map(ErrorEntry::from).collect(),
        }
    }

    /// Print as JSON or as `PASS`/`FAIL` lines.
    pub fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }
        if self.valid {
            println!("PASS: {}", self.file);
            return Ok(());
        }
        println!("FAIL: {}", self.file);
        for err in &self.errors {
            match err.context.get("path").and_then(Value::as_str) {
                Some(path) if !path.is_empty() => {
                    println!("  {} at {}: {}", err.code, path, err.message)
                }
                _ => println!("  {}: {}", err.code, err.message),
            }
        }
        Ok(())
    }

    pub fn exit_code(&self) -> u8 {
        if self.valid {
            0
        } else {
            1
        }
    }
}
