//! Configuration types and loading
//!
//! Defaults a composer starts from when it is built with
//! `QueryComposer::with_config`. Values can be overridden through the
//! environment.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::pagination::DEFAULT_MAX_PER_PAGE;
use crate::result::ConfigResult;
use crate::types::SortDirection;

pub const ENV_PER_PAGE: &str = "QUERY_COMPOSER_PER_PAGE";
pub const ENV_MAX_PER_PAGE: &str = "QUERY_COMPOSER_MAX_PER_PAGE";
pub const ENV_PAGINATED: &str = "QUERY_COMPOSER_PAGINATED";
pub const ENV_SORT_DIRECTION: &str = "QUERY_COMPOSER_SORT_DIRECTION";

/// Composer defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComposerConfig {
    /// Page size a new composer starts with
    pub per_page: i64,
    /// Ceiling applied when turning a page number into limit/offset
    pub max_per_page: i64,
    /// Whether results are paginated by default
    pub paginated: bool,
    /// Direction used when a sort column is chosen without one
    pub sort_direction: SortDirection,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            per_page: 15,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            paginated: true,
            sort_direction: SortDirection::Asc,
        }
    }
}

impl ComposerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_PER_PAGE) {
            config.per_page = parse_positive(ENV_PER_PAGE, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_PER_PAGE) {
            config.max_per_page = parse_positive(ENV_MAX_PER_PAGE, &value)?;
        }
        if let Some(value) = lookup(ENV_PAGINATED) {
            config.paginated = parse_bool(ENV_PAGINATED, &value)?;
        }
        if let Some(value) = lookup(ENV_SORT_DIRECTION) {
            config.sort_direction = SortDirection::from_str(&value).ok_or_else(|| {
                ConfigurationError::invalid_value(ENV_SORT_DIRECTION, "expected asc or desc")
            })?;
        }

        if config.per_page > config.max_per_page {
            return Err(ConfigurationError::invalid_value(
                ENV_PER_PAGE,
                format!("{} exceeds the maximum of {}", config.per_page, config.max_per_page),
            ));
        }

        tracing::debug!(
            per_page = config.per_page,
            max_per_page = config.max_per_page,
            paginated = config.paginated,
            sort_direction = %config.sort_direction,
            "Loaded composer configuration"
        );

        Ok(config)
    }
}

fn parse_positive(key: &str, value: &str) -> ConfigResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(n) => Err(ConfigurationError::invalid_value(
            key,
            format!("{} is not a positive number", n),
        )),
        Err(e) => Err(ConfigurationError::invalid_value(key, e.to_string())),
    }
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigurationError::invalid_value(
            key,
            format!("{:?} is not a boolean", other),
        )),
    }
}
