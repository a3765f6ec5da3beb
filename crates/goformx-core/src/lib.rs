//! # goformx-core — Foundational Types for GoFormX
//!
//! The leaf crate of the GoFormX workspace. Every other crate depends on
//! `goformx-core`; it depends on nothing internal.
//!
//! ## Contents
//!
//! 1. **Domain error taxonomy.** [`DomainError`] carries a stable
//!    [`ErrorCode`], a human message, an optional wrapped cause, and a
//!    context map of field-level annotations. Codes form a flat enumeration
//!    grouped by [`ErrorGroup`] and map totally onto a [`StatusCategory`].
//!
//! 2. **Sentinel errors.** A closed set of named error values ([`Sentinel`])
//!    compared by identity through [`DomainError::is`], never by message text.
//!
//! 3. **Identifier newtypes.** `FormId`, `UserId`, `SubmissionId`. You
//!    cannot pass a submission identifier where a form identifier is expected.
//!
//! 4. **UTC timestamps.** [`Timestamp`] truncates to seconds precision so
//!    persisted `created_at`/`updated_at` values compare deterministically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `goformx-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::{
    is_authentication_error, is_conflict_error, is_forbidden_error, is_form_error, is_not_found,
    is_system_error, is_user_error, is_validation, DomainError, ErrorCode, ErrorGroup, Sentinel,
    StatusCategory, UnknownErrorCode,
};
pub use identity::{FormId, SubmissionId, UserId};
pub use temporal::Timestamp;
