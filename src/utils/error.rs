use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("File not found: {path}")]
    NotFound { path: String },

    /// Errors raised by the underlying object storage client, passed through as-is.
    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Storage,
    Connectivity,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl StorageError {
    /// Wraps a client-side error so it propagates unchanged through `Remote`.
    pub fn remote<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StorageError::Remote(anyhow::Error::new(error))
    }

    pub fn config(message: impl Into<String>) -> Self {
        StorageError::ConfigError {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StorageError::ConfigError { .. }
            | StorageError::InvalidConfigValueError { .. }
            | StorageError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            StorageError::ValidationError { .. } | StorageError::NotFound { .. } => {
                ErrorCategory::Storage
            }
            StorageError::Remote(_) => ErrorCategory::Connectivity,
            StorageError::IoError(_) | StorageError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Connectivity => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StorageError::ConfigError { .. } => {
                "Check that every required field of the storage location is set"
            }
            StorageError::InvalidConfigValueError { .. }
            | StorageError::ConfigValidationError { .. } => {
                "Fix the reported field in the configuration file and try again"
            }
            StorageError::ValidationError { .. } => {
                "Make sure the storage location root exists and is accessible"
            }
            StorageError::NotFound { .. } => "Check the path relative to the storage location",
            StorageError::Remote(_) => {
                "Verify credentials, bucket, region and endpoint, and that the service is reachable"
            }
            StorageError::IoError(_) => "Check file permissions and available disk space",
            StorageError::SerializationError(_) => "Report this issue with the failing input",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Storage location is misconfigured: {}", self),
            ErrorCategory::Storage => format!("Storage operation failed: {}", self),
            ErrorCategory::Connectivity => {
                format!("Could not reach the storage backend: {}", self)
            }
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("access denied")]
    struct Denied;

    #[test]
    fn test_remote_error_displays_source_verbatim() {
        let err = StorageError::remote(Denied);
        assert_eq!(err.to_string(), "access denied");
        assert_eq!(err.category(), ErrorCategory::Connectivity);

        match err {
            StorageError::Remote(inner) => assert!(inner.downcast_ref::<Denied>().is_some()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_severity_by_category() {
        assert_eq!(
            StorageError::config("Amazon S3 bucket is empty.").severity(),
            ErrorSeverity::High
        );
        assert_eq!(
            StorageError::NotFound {
                path: "a".to_string()
            }
            .severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            StorageError::from(std::io::Error::other("disk full")).severity(),
            ErrorSeverity::Critical
        );
        assert!(StorageError::remote(Denied).severity() > ErrorSeverity::Medium);
    }
}
