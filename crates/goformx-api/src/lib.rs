//! # goformx-api — HTTP Error Contract
//!
//! The boundary between GoFormX domain errors and HTTP clients. Route
//! handlers and persistence live elsewhere; this crate only fixes how a
//! failure looks on the wire and how request bodies become validated forms.
//!
//! ## Crate Policy
//!
//! - No business logic. Validation is delegated to `goformx-form`.
//! - All errors map to structured responses via [`ApiError`].
//! - Server-side failures never leak their message or context.

pub mod error;
pub mod extractors;

pub use error::{ApiError, ErrorBody, ErrorDetail};
pub use extractors::{extract_json, extract_validated_form};
