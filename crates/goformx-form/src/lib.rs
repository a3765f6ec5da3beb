//! # goformx-form — Form Definitions and Their Validation
//!
//! Everything that decides whether a form, or an answer to it, may be
//! persisted.
//!
//! ## Modules
//!
//! - [`form`]: the [`FormDefinition`] entity and the untrusted [`FormDraft`]
//!   it is built from.
//! - [`shape`]: the two schema shapes as [`SchemaShape`] strategies, selected
//!   by a [`SchemaDialect`].
//! - [`validate`]: [`FormValidator`] with fail-fast and accumulating entry
//!   points.
//! - [`config`]: length limits and dialect, overridable from the environment.
//! - [`submission`]: [`FormSubmission`] and its status machine, plus
//!   [`SubmissionValidator`].
//! - [`document`]: JSON/YAML file loading.
//!
//! ## Crate Policy
//!
//! - Validation never mutates its input and holds no mutable state.
//! - All failures surface as [`goformx_core::DomainError`].

pub mod config;
pub mod document;
pub mod form;
pub mod shape;
pub mod submission;
pub mod validate;

pub use config::{ConfigError, FormLimits, ValidatorConfig};
pub use document::{load_as, load_document, parse_document, yaml_to_json_value, DocumentFormat};
pub use form::{FormDefinition, FormDraft};
pub use shape::{
    FieldsArrayShape, JsonSchemaShape, SchemaDialect, SchemaShape, SchemaShapeError, ShapeKind,
};
pub use submission::{
    FormSubmission, SubmissionShapeError, SubmissionStatus, SubmissionValidator, Violation,
};
pub use validate::{validate, FormValidator, ValidationReport};
