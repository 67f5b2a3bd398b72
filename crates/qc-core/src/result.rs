//! Result type aliases

use crate::error::ConfigurationError;

/// Result of a configuration-time operation
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Reject names that are empty or only whitespace
pub fn require_name(entity: &'static str, name: impl Into<String>) -> ConfigResult<String> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(ConfigurationError::empty_name(entity));
    }
    Ok(name)
}
