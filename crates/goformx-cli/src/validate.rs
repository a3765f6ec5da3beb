//! # Validate Subcommand
//!
//! `goformx validate <FILE> [--dialect auto|fields|json-schema] [--all] [--json]`
//!
//! Loads a form definition (`title`, `description`, `schema`) from a JSON or
//! YAML file and runs the form validator over it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use goformx_core::UserId;
use goformx_form::{load_as, FormDraft, FormValidator, SchemaDialect, ValidatorConfig};

use crate::Outcome;

/// Arguments for the `goformx validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Form definition file (.json, .yaml or .yml).
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Schema dialect to enforce.
    #[arg(long, env = "GOFORMX_SCHEMA_DIALECT")]
    pub dialect: Option<SchemaDialect>,

    /// Report every problem instead of stopping at the first.
    #[arg(long)]
    pub all: bool,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Build the validator from the environment, with `--dialect` taking
/// precedence.
pub fn validator_for(dialect: Option<SchemaDialect>) -> Result<FormValidator> {
    let mut config = ValidatorConfig::from_env().context("invalid validator configuration")?;
    if let Some(dialect) = dialect {
        config.dialect = dialect;
    }
    Ok(FormValidator::new(config))
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure. Unreadable or
/// unparsable files are returned as errors.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let validator = validator_for(args.dialect)?;
    let path = &args.path;

    let draft: FormDraft =
        load_as(path).with_context(|| format!("failed to load {}", path.display()))?;
    // Files carry no owner; a fresh identity keeps the record well-formed.
    let errors = match draft.into_form(UserId::new()) {
        Err(err) => vec![err],
        Ok(form) if args.all => match validator.validate_all(&form) {
            Ok(()) => Vec::new(),
            Err(report) => report.into_inner(),
        },
        Ok(form) => validator.validate(&form).err().into_iter().collect(),
    };

    tracing::info!(
        file = %path.display(),
        dialect = %validator.config().dialect,
        failures = errors.len(),
        "validated form definition"
    );

    let outcome = Outcome::new(path, &errors);
    outcome.print(args.json)?;
    Ok(outcome.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn test_repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.pop();
        dir
    }

    fn args(path: PathBuf) -> ValidateArgs {
        ValidateArgs {
            path,
            dialect: None,
            all: false,
            json: false,
        }
    }

    #[test]
    fn test_valid_fixture_exits_zero() {
        let path = test_repo_root().join("forms/contact-us.json");
        assert_eq!(run_validate(&args(path)).unwrap(), 0);
    }

    #[test]
    fn test_yaml_fixture_exits_zero() {
        let path = test_repo_root().join("forms/feedback.yaml");
        assert_eq!(run_validate(&args(path)).unwrap(), 0);
    }

    #[test]
    fn test_invalid_fixture_exits_one() {
        let path = test_repo_root().join("forms/invalid/missing-label.json");
        assert_eq!(run_validate(&args(path.clone())).unwrap(), 1);

        let mut all = args(path);
        all.all = true;
        all.json = true;
        assert_eq!(run_validate(&all).unwrap(), 1);
    }

    #[test]
    fn test_wrong_dialect_fails() {
        let mut a = args(test_repo_root().join("forms/contact-us.json"));
        a.dialect = Some(SchemaDialect::JsonSchema);
        assert_eq!(run_validate(&a).unwrap(), 1);
    }

    #[test]
    fn test_non_object_schema_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        std::fs::write(&path, r#"{ "title": "Survey", "schema": [] }"#).unwrap();
        assert_eq!(run_validate(&args(path)).unwrap(), 1);
    }

    #[test]
    fn test_relative_path_read_from_working_directory() {
        // Test binaries run from the package directory.
        let path = PathBuf::from("../../forms/contact-us.json");
        assert!(path.is_relative());
        assert_eq!(run_validate(&args(path)).unwrap(), 0);
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = run_validate(&args(Path::new("/nonexistent/form.json").to_path_buf()));
        assert!(result.is_err());
    }

    #[test]
    fn test_unparsable_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.yaml");
        std::fs::write(&path, "title: [unclosed\n").unwrap();
        assert!(run_validate(&args(path)).is_err());
    }
}
