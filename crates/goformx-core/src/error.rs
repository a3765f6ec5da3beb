//! # Domain Error Taxonomy
//!
//! Defines [`DomainError`], the single error type raised by GoFormX domain
//! logic, together with the classification machinery the HTTP layer uses to
//! turn an error into a response.
//!
//! ## Design
//!
//! - Codes are a flat enumeration ([`ErrorCode`]). Each code belongs to
//!   exactly one [`ErrorGroup`] and maps to exactly one [`StatusCategory`].
//! - Wire strings are SCREAMING_SNAKE (`VALIDATION_ERROR`, `FORM_INVALID`).
//!   Unrecognized wire strings classify as [`StatusCategory::ServerError`].
//! - The context map holds field-level annotations (`field`, `path`,
//!   `property`, ...) and is the only part of an error that may change after
//!   construction.
//! - [`DomainError::wrap`] keeps the deepest context: when the cause is itself
//!   a `DomainError`, its context map is carried forward as-is.
//! - Sentinel errors ([`Sentinel`]) are compared by identity via
//!   [`DomainError::is`], never by message text. The comparison sees through
//!   [`DomainError::wrap`].

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Error Codes ─────────────────────────────────────────────────────

/// Stable, machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    ValidationRequired,
    ValidationInvalid,
    ValidationInvalidFormat,
    ValidationInvalidInput,
    /// Generic validation failure.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    BadRequest,

    // Authentication
    Unauthorized,
    AuthenticationError,

    // Authorization
    Forbidden,
    InsufficientRole,

    // Lookup
    NotFound,

    // Conflict
    Conflict,
    AlreadyExists,

    // System / lifecycle
    ServerError,
    StartupError,
    ShutdownError,
    ConfigError,
    DatabaseError,
    Timeout,

    // Form domain
    #[serde(rename = "FORM_VALIDATION_ERROR")]
    FormValidation,
    FormNotFound,
    #[serde(rename = "FORM_SUBMISSION_ERROR")]
    FormSubmission,
    FormAccessDenied,
    FormInvalid,
    FormExpired,

    // User domain
    UserNotFound,
    UserExists,
    UserDisabled,
    UserInvalid,
    UserUnauthorized,
}

impl ErrorCode {
    /// Every defined code, in declaration order.
    pub const ALL: [ErrorCode; 30] = [
        Self::ValidationRequired,
        Self::ValidationInvalid,
        Self::ValidationInvalidFormat,
        Self::ValidationInvalidInput,
        Self::Validation,
        Self::BadRequest,
        Self::Unauthorized,
        Self::AuthenticationError,
        Self::Forbidden,
        Self::InsufficientRole,
        Self::NotFound,
        Self::Conflict,
        Self::AlreadyExists,
        Self::ServerError,
        Self::StartupError,
        Self::ShutdownError,
        Self::ConfigError,
        Self::DatabaseError,
        Self::Timeout,
        Self::FormValidation,
        Self::FormNotFound,
        Self::FormSubmission,
        Self::FormAccessDenied,
        Self::FormInvalid,
        Self::FormExpired,
        Self::UserNotFound,
        Self::UserExists,
        Self::UserDisabled,
        Self::UserInvalid,
        Self::UserUnauthorized,
    ];

    /// The wire representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationRequired => "VALIDATION_REQUIRED",
            Self::ValidationInvalid => "VALIDATION_INVALID",
            Self::ValidationInvalidFormat => "VALIDATION_INVALID_FORMAT",
            Self::ValidationInvalidInput => "VALIDATION_INVALID_INPUT",
            Self::Validation => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::Forbidden => "FORBIDDEN",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::ServerError => "SERVER_ERROR",
            Self::StartupError => "STARTUP_ERROR",
            Self::ShutdownError => "SHUTDOWN_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::FormValidation => "FORM_VALIDATION_ERROR",
            Self::FormNotFound => "FORM_NOT_FOUND",
            Self::FormSubmission => "FORM_SUBMISSION_ERROR",
            Self::FormAccessDenied => "FORM_ACCESS_DENIED",
            Self::FormInvalid => "FORM_INVALID",
            Self::FormExpired => "FORM_EXPIRED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserExists => "USER_EXISTS",
            Self::UserDisabled => "USER_DISABLED",
            Self::UserInvalid => "USER_INVALID",
            Self::UserUnauthorized => "USER_UNAUTHORIZED",
        }
    }

    /// The semantic family this code belongs to.
    pub fn group(&self) -> ErrorGroup {
        match self {
            Self::ValidationRequired
            | Self::ValidationInvalid
            | Self::ValidationInvalidFormat
            | Self::ValidationInvalidInput
            | Self::Validation
            | Self::BadRequest => ErrorGroup::Validation,
            Self::Unauthorized | Self::AuthenticationError => ErrorGroup::Authentication,
            Self::Forbidden | Self::InsufficientRole => ErrorGroup::Authorization,
            Self::NotFound => ErrorGroup::NotFound,
            Self::Conflict | Self::AlreadyExists => ErrorGroup::Conflict,
            Self::ServerError
            | Self::StartupError
            | Self::ShutdownError
            | Self::ConfigError
            | Self::DatabaseError
            | Self::Timeout => ErrorGroup::System,
            Self::FormValidation
            | Self::FormNotFound
            | Self::FormSubmission
            | Self::FormAccessDenied
            | Self::FormInvalid
            | Self::FormExpired => ErrorGroup::Form,
            Self::UserNotFound
            | Self::UserExists
            | Self::UserDisabled
            | Self::UserInvalid
            | Self::UserUnauthorized => ErrorGroup::User,
        }
    }

    /// Shorthand for [`StatusCategory::of`].
    pub fn status_category(&self) -> StatusCategory {
        StatusCategory::of(*self)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that is not a defined error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0:?}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

// ─── Groups & Status Categories ──────────────────────────────────────

/// Semantic family of an [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorGroup {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    System,
    Form,
    User,
}

/// Class of response an error code maps to, independent of wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ServerError,
    ServiceUnavailable,
    GatewayTimeout,
}

impl StatusCategory {
    /// Map a code to its status category. Total over [`ErrorCode`].
    pub fn of(code: ErrorCode) -> Self {
        match code {
            ErrorCode::ValidationRequired
            | ErrorCode::ValidationInvalid
            | ErrorCode::ValidationInvalidFormat
            | ErrorCode::ValidationInvalidInput
            | ErrorCode::Validation
            | ErrorCode::BadRequest
            | ErrorCode::FormValidation
            | ErrorCode::FormSubmission
            | ErrorCode::FormInvalid
            | ErrorCode::FormExpired
            | ErrorCode::UserInvalid => Self::BadRequest,

            ErrorCode::Unauthorized
            | ErrorCode::AuthenticationError
            | ErrorCode::UserUnauthorized => Self::Unauthorized,

            ErrorCode::Forbidden
            | ErrorCode::InsufficientRole
            | ErrorCode::FormAccessDenied
            | ErrorCode::UserDisabled => Self::Forbidden,

            ErrorCode::NotFound | ErrorCode::FormNotFound | ErrorCode::UserNotFound => {
                Self::NotFound
            }

            ErrorCode::Conflict | ErrorCode::AlreadyExists | ErrorCode::UserExists => {
                Self::Conflict
            }

            ErrorCode::ServerError
            | ErrorCode::StartupError
            | ErrorCode::ConfigError
            | ErrorCode::DatabaseError => Self::ServerError,

            ErrorCode::ShutdownError => Self::ServiceUnavailable,
            ErrorCode::Timeout => Self::GatewayTimeout,
        }
    }

    /// Classify a wire code string. Unrecognized or empty strings are
    /// `ServerError`.
    pub fn of_code_str(code: &str) -> Self {
        code.parse::<ErrorCode>()
            .map(Self::of)
            .unwrap_or(Self::ServerError)
    }

    /// The HTTP status number for this category.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::ServerError => 500,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
        }
    }

    /// Whether the failure is on the server side (5xx).
    pub fn is_server_side(&self) -> bool {
        self.http_status() >= 500
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::ServerError => "SERVER_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
        };
        f.write_str(s)
    }
}

// ─── Sentinels ───────────────────────────────────────────────────────

/// Named error values that callers compare by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// The form title is empty.
    TitleRequired,
    /// The form schema is absent.
    SchemaRequired,
}

impl Sentinel {
    /// All sentinels share the `FORM_INVALID` code.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::FormInvalid
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::TitleRequired => "form title is required",
            Self::SchemaRequired => "form schema is required",
        }
    }

    /// Materialize the sentinel as a [`DomainError`].
    pub fn error(&self) -> DomainError {
        let field = match self {
            Self::TitleRequired => "title",
            Self::SchemaRequired => "schema",
        };
        let mut err = DomainError::new(self.code(), self.message()).with_context("field", field);
        err.sentinel = Some(*self);
        err
    }
}

impl From<Sentinel> for DomainError {
    fn from(sentinel: Sentinel) -> Self {
        sentinel.error()
    }
}

// ─── DomainError ─────────────────────────────────────────────────────

type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// A typed domain error: stable code, human message, optional cause, and
/// free-form context annotations.
#[derive(Debug, Clone)]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    source: Option<Cause>,
    context: BTreeMap<String, Value>,
    sentinel: Option<Sentinel>,
}

impl DomainError {
    /// Construct an error with no cause and an empty context map.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
            sentinel: None,
        }
    }

    /// Construct an error with an underlying cause. The context map starts
    /// empty regardless of the cause's type.
    pub fn with_source<E>(code: ErrorCode, message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            source: Some(Arc::new(cause)),
            ..Self::new(code, message)
        }
    }

    /// Wrap a lower-level failure under a new code.
    ///
    /// If `cause` is itself a `DomainError`, its context map becomes this
    /// error's context map unchanged.
    pub fn wrap<E>(cause: E, code: ErrorCode, message: impl Into<String>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let context = (&cause as &(dyn StdError + 'static))
            .downcast_ref::<DomainError>()
            .map(|inner| inner.context.clone())
            .unwrap_or_default();
        Self {
            context,
            ..Self::with_source(code, message, cause)
        }
    }

    /// Add a context entry and return the error for chaining.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_context(key, value);
        self
    }

    /// Add a context entry in place. An existing entry under `key` is replaced.
    pub fn insert_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.insert(key.into(), value.into());
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    /// Look up a single context entry.
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// The wrapped cause, if any.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn group(&self) -> ErrorGroup {
        self.code.group()
    }

    pub fn status_category(&self) -> StatusCategory {
        StatusCategory::of(self.code)
    }

    /// Whether this error, or any `DomainError` it wraps, is the given
    /// sentinel.
    pub fn is(&self, sentinel: Sentinel) -> bool {
        Self::is_in(self, sentinel)
    }

    /// Whether any `DomainError` in an error's source chain, starting with
    /// the error itself, is the given sentinel.
    pub fn is_in(err: &(dyn StdError + 'static), sentinel: Sentinel) -> bool {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(domain) = e.downcast_ref::<DomainError>() {
                if domain.sentinel == Some(sentinel) && domain.code == sentinel.code() {
                    return true;
                }
            }
            current = e.source();
        }
        false
    }

    /// The sentinel identity, if this error was produced from one.
    pub fn sentinel(&self) -> Option<Sentinel> {
        self.sentinel
    }

    /// Find the first `DomainError` in an error's source chain, starting with
    /// the error itself.
    pub fn find_in<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a DomainError> {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(domain) = e.downcast_ref::<DomainError>() {
                return Some(domain);
            }
            current = e.source();
        }
        None
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl StdError for DomainError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn StdError + 'static))
    }
}

// ─── Predicates ──────────────────────────────────────────────────────

fn in_group(err: &(dyn StdError + 'static), group: ErrorGroup) -> bool {
    DomainError::find_in(err).is_some_and(|domain| domain.group() == group)
}

/// Whether the error carries a validation-family code.
pub fn is_validation(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::Validation)
}

/// Whether the error carries the generic `NOT_FOUND` code.
pub fn is_not_found(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::NotFound)
}

pub fn is_form_error(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::Form)
}

pub fn is_user_error(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::User)
}

pub fn is_authentication_error(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::Authentication)
}

pub fn is_conflict_error(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::Conflict)
}

pub fn is_forbidden_error(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::Authorization)
}

/// Whether the error carries a system or lifecycle code (startup, shutdown,
/// config, database, timeout, generic server error).
pub fn is_system_error(err: &(dyn StdError + 'static)) -> bool {
    in_group(err, ErrorGroup::System)
}
