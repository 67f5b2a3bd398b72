//! Core error types for query-composer
//!
//! Applying filters never fails: malformed operators and values degrade
//! leniently. The only reportable errors are configuration mistakes, caught
//! while filters, sorts, and composer defaults are being set up.

use thiserror::Error;

/// Programmer misuse detected while configuring filters, sorts, or defaults
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Configuration error: {entity} name must not be empty")]
    EmptyName { entity: &'static str },

    #[error("Configuration error: invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigurationError {
    pub fn empty_name(entity: &'static str) -> Self {
        Self::EmptyName { entity }
    }

    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigurationError::EmptyName { .. } => "empty_name",
            ConfigurationError::InvalidValue { .. } => "invalid_value",
        }
    }
}
