//! Executor errors

/// Error type for executing composed queries
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Row decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ExecutorError {
    /// Stable error code for clients and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "database_error",
            Self::Decode(_) => "decode_error",
        }
    }
}

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ExecutorError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.error_code(), "database_error");
        assert!(err.to_string().starts_with("Database error"));

        let decode = serde_json::from_str::<u32>("x").unwrap_err();
        assert_eq!(ExecutorError::from(decode).error_code(), "decode_error");
    }
}
