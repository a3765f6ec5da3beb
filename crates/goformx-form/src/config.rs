//! # Validator Configuration
//!
//! Length limits and schema dialect for [`FormValidator`](crate::FormValidator).
//! Defaults match the persisted data model; every value can be overridden
//! from the environment:
//!
//! | Variable                          | Default |
//! |-----------------------------------|---------|
//! | `GOFORMX_SCHEMA_DIALECT`          | `auto`  |
//! | `GOFORMX_MIN_TITLE_LENGTH`        | `3`     |
//! | `GOFORMX_MAX_TITLE_LENGTH`        | `100`   |
//! | `GOFORMX_MAX_DESCRIPTION_LENGTH`  | `500`   |

use goformx_core::{DomainError, ErrorCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shape::SchemaDialect;

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

pub const ENV_SCHEMA_DIALECT: &str = "GOFORMX_SCHEMA_DIALECT";
pub const ENV_MIN_TITLE_LENGTH: &str = "GOFORMX_MIN_TITLE_LENGTH";
pub const ENV_MAX_TITLE_LENGTH: &str = "GOFORMX_MAX_TITLE_LENGTH";
pub const ENV_MAX_DESCRIPTION_LENGTH: &str = "GOFORMX_MAX_DESCRIPTION_LENGTH";

/// Errors loading validator configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("minimum title length {min} exceeds maximum {max}")]
    InconsistentTitleLimits { min: usize, max: usize },
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        DomainError::with_source(ErrorCode::ConfigError, message, err)
    }
}

/// Character-count limits for form metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLimits {
    pub min_title_length: usize,
    pub max_title_length: usize,
    pub max_description_length: usize,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            min_title_length: MIN_TITLE_LENGTH,
            max_title_length: MAX_TITLE_LENGTH,
            max_description_length: MAX_DESCRIPTION_LENGTH,
        }
    }
}

/// Configuration for form definition validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub dialect: SchemaDialect,
    pub limits: FormLimits,
}

impl ValidatorConfig {
    /// Load configuration from process environment variables, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SCHEMA_DIALECT) {
            config.dialect = raw.parse::<SchemaDialect>().map_err(|e| ConfigError::InvalidValue {
                var: ENV_SCHEMA_DIALECT,
                value: raw.clone(),
                reason: e.message().to_string(),
            })?;
        }

        let limits = &mut config.limits;
        for (var, slot) in [
            (ENV_MIN_TITLE_LENGTH, &mut limits.min_title_length),
            (ENV_MAX_TITLE_LENGTH, &mut limits.max_title_length),
            (ENV_MAX_DESCRIPTION_LENGTH, &mut limits.max_description_length),
        ] {
            if let Some(raw) = lookup(var) {
                *slot = parse_length(var, &raw)?;
            }
        }

        config.check()?;
        Ok(config)
    }

    /// Reject limit combinations no title could satisfy.
    pub fn check(&self) -> Result<(), ConfigError> {
        let FormLimits {
            min_title_length: min,
            max_title_length: max,
            ..
        } = self.limits;
        if min > max {
            return Err(ConfigError::InconsistentTitleLimits { min, max });
        }
        Ok(())
    }
}

fn parse_length(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
