//! # Submission Subcommand
//!
//! `goformx submission <FORM_FILE> <SUBMISSION_FILE> [--dialect ...] [--json]`
//!
//! The submission file holds the answers only, as a single JSON or YAML
//! object keyed by field name.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

use goformx_core::UserId;
use goformx_form::{load_as, FormDraft, FormSubmission, SchemaDialect, SubmissionValidator};

use crate::Outcome;

/// Arguments for the `goformx submission` subcommand.
#[derive(Args, Debug)]
pub struct SubmissionArgs {
    /// Form definition file.
    #[arg(value_name = "FORM_FILE")]
    pub form: PathBuf,

    /// Submission data file.
    #[arg(value_name = "SUBMISSION_FILE")]
    pub submission: PathBuf,

    /// Schema dialect of the form.
    #[arg(long, env = "GOFORMX_SCHEMA_DIALECT")]
    pub dialect: Option<SchemaDialect>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the submission subcommand. Exit codes as for `validate`.
pub fn run_submission(args: &SubmissionArgs) -> Result<u8> {
    let form_path = &args.form;
    let data_path = &args.submission;

    let draft: FormDraft = load_as(form_path)
        .with_context(|| format!("failed to load form {}", form_path.display()))?;
    let data: Map<String, Value> = load_as(data_path)
        .with_context(|| format!("failed to load submission {}", data_path.display()))?;

    let validator = SubmissionValidator::new(args.dialect.unwrap_or_default());
    let errors = match draft.into_form(UserId::new()) {
        Err(err) => vec![err],
        Ok(form) => {
            let submission = FormSubmission::new(form.id(), data);
            validator.validate(&form, &submission).err().into_iter().collect()
        }
    };

    tracing::info!(
        form = %form_path.display(),
        submission = %data_path.display(),
        failures = errors.len(),
        "validated submission"
    );

    let outcome = Outcome::new(data_path, &errors);
    outcome.print(args.json)?;
    Ok(outcome.exit_code())
}
