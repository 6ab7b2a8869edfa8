//! # Store Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  std::io / serde_json / toml ──┐                                        │
//! │  CoreError (domain rules) ─────┼──► StoreError (this module)            │
//! │  unsupported upload ───────────┘          │                             │
//! │                                           ▼                             │
//! │                                  CliError { code, message }             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use suite_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted JSON could not be read or written.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An uploaded template file is neither PNG, JPEG nor PDF.
    #[error("Unsupported file type for {path}: expected PNG, JPEG or PDF")]
    UnsupportedMediaType { path: String },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record id does not exist in its collection.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::Config(err.to_string())
    }
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_pass_through() {
        let err: StoreError = CoreError::InsufficientStock {
            sku: "PAP-A4".to_string(),
            available: 2,
            requested: 5,
        }
        .into();
        assert!(matches!(err, StoreError::Core(_)));
        assert_eq!(
            err.to_string(),
            "Insufficient stock for PAP-A4: available 2, requested 5"
        );
    }

    #[test]
    fn test_toml_error_is_config() {
        let err: StoreError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
