//! # Form Definition Validation
//!
//! Structural checks a form record must pass before it is persisted.
//!
//! [`FormValidator::validate`] is fail-fast and runs the rules in a fixed
//! order: title, description, schema presence, schema shape. The first
//! failing rule decides the returned error.
//!
//! [`FormValidator::validate_all`] runs every rule independently and
//! collects the failures, including every schema-shape violation, into a
//! [`ValidationReport`].

use std::fmt;

use goformx_core::{DomainError, ErrorCode, Sentinel};
use serde_json::{json, Map, Value};

use crate::config::ValidatorConfig;
use crate::form::FormDefinition;
use crate::shape::SchemaShapeError;

/// Validates form definitions against configured limits and schema dialect.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads and reused for any number of forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormValidator {
    config: ValidatorConfig,
}

impl FormValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a form definition, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// - [`Sentinel::TitleRequired`] for an empty title.
    /// - `VALIDATION_ERROR` for a title or description outside its bounds.
    /// - [`Sentinel::SchemaRequired`] for an absent schema.
    /// - `VALIDATION_ERROR` for an empty schema or a schema-shape violation.
    ///   Shape violations keep the [`SchemaShapeError`] as their source.
    pub fn validate(&self, form: &FormDefinition) -> Result<(), DomainError> {
        let result = self.first_failure(form);
        match &result {
            Ok(()) => tracing::debug!(
                form_id = %form.id(),
                dialect = %self.config.dialect,
                "form definition valid"
            ),
            Err(err) => tracing::debug!(
                form_id = %form.id(),
                dialect = %self.config.dialect,
                code = %err.code(),
                error = %err.message(),
                "form definition rejected"
            ),
        }
        result
    }

    /// Validate a form definition, collecting every failure.
    pub fn validate_all(&self, form: &FormDefinition) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::default();

        if let Err(err) = self.check_title(form.title()) {
            report.push(err);
        }
        if let Err(err) = self.check_description(form.description()) {
            report.push(err);
        }
        match self.check_schema_present(form.schema()) {
            Ok(schema) => {
                let shape = self.config.dialect.resolve(schema);
                for violation in shape.violations(schema) {
                    report.push(violation.into_domain_error());
                }
            }
            Err(err) => report.push(err),
        }

        tracing::debug!(
            form_id = %form.id(),
            dialect = %self.config.dialect,
            failures = report.len(),
            "form definition checked"
        );
        report.into_result()
    }

    fn first_failure(&self, form: &FormDefinition) -> Result<(), DomainError> {
        self.check_title(form.title())?;
        self.check_description(form.description())?;
        let schema = self.check_schema_present(form.schema())?;
        self.config
            .dialect
            .resolve(schema)
            .check(schema)
            .map_err(SchemaShapeError::into_domain_error)
    }

    fn check_title(&self, title: &str) -> Result<(), DomainError> {
        if title.is_empty() {
            return Err(Sentinel::TitleRequired.error());
        }
        let limits = &self.config.limits;
        let actual = title.chars().count();
        if actual < limits.min_title_length {
            return Err(DomainError::new(
                ErrorCode::Validation,
                format!(
                    "form title must be at least {} characters",
                    limits.min_title_length
                ),
            )
            .with_context("field", "title")
            .with_context("min", limits.min_title_length)
            .with_context("actual", actual));
        }
        if actual > limits.max_title_length {
            return Err(DomainError::new(
                ErrorCode::Validation,
                format!(
                    "form title must not exceed {} characters",
                    limits.max_title_length
                ),
            )
            .with_context("field", "title")
            .with_context("max", limits.max_title_length)
            .with_context("actual", actual));
        }
        Ok(())
    }

    fn check_description(&self, description: &str) -> Result<(), DomainError> {
        let max = self.config.limits.max_description_length;
        let actual = description.chars().count();
        if actual > max {
            return Err(DomainError::new(
                ErrorCode::Validation,
                format!("form description must not exceed {max} characters"),
            )
            .with_context("field", "description")
            .with_context("max", max)
            .with_context("actual", actual));
        }
        Ok(())
    }

    fn check_schema_present<'a>(
        &self,
        schema: Option<&'a Map<String, Value>>,
    ) -> Result<&'a Map<String, Value>, DomainError> {
        match schema {
            None => Err(Sentinel::SchemaRequired.error()),
            Some(schema) if schema.is_empty() => Err(DomainError::new(
                ErrorCode::Validation,
                "form schema must not be empty",
            )
            .with_context("field", "schema")),
            Some(schema) => Ok(schema),
        }
    }
}

/// Validate a form definition with the default configuration.
pub fn validate(form: &FormDefinition) -> Result<(), DomainError> {
    FormValidator::default().validate(form)
}

// ─── Report ──────────────────────────────────────────────────────────

/// Every failure found by [`FormValidator::validate_all`], in rule order.
///
/// As an error, the report's `source()` is its first entry, so chain-walking
/// checks such as [`DomainError::is_in`] and the `is_*` predicates see that
/// entry. Convert with `DomainError::from` to classify the report as a whole
/// (`VALIDATION_ERROR`).
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    errors: Vec<DomainError>,
}

impl ValidationReport {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[DomainError] {
        &self.errors
    }

    pub fn into_inner(self) -> Vec<DomainError> {
        self.errors
    }

    pub fn push(&mut self, err: DomainError) {
        self.errors.push(err);
    }

    /// `Ok` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl From<ValidationReport> for DomainError {
    fn from(report: ValidationReport) -> Self {
        let errors: Vec<Value> = report
            .errors
            .iter()
            .map(|err| {
                json!({
                    "code": err.code().as_str(),
                    "message": err.message(),
                    "context": err.context(),
                })
            })
            .collect();
        DomainError::new(
            ErrorCode::Validation,
            format!("form definition has {} problem(s)", report.len()),
        )
        .with_context("errors", errors)
    }
}
