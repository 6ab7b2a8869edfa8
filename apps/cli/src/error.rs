//! # CLI Error Type
//!
//! Unified error type for command handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the `suite` CLI                        │
//! │                                                                         │
//! │  Command handler: Result<CommandOutput, CliError>                       │
//! │         │                                                               │
//! │         ├── CoreError  (status, stock, validation) ──┐                  │
//! │         ├── StoreError (I/O, JSON, upload, config) ──┼──► CliError      │
//! │         └── DocError   (missing template, PDF) ──────┘      │           │
//! │                                                             ▼           │
//! │                         stderr: "error[NOT_FOUND]: Invoice not found"   │
//! │                         exit code by category                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use suite_core::CoreError;
use suite_docs::DocError;
use suite_store::StoreError;

/// Error returned from a command.
///
/// ## Serialization
/// With `--json`, failures print as:
/// ```json
/// { "code": "TEMPLATE_NOT_FOUND", "message": "Custom template not found: custom_1" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Custom template failed validation
    InvalidTemplate,

    /// Custom template referenced by a document is gone
    TemplateNotFound,

    /// Operation not allowed in the record's current status
    InvalidStatus,

    /// Not enough stock for a checkout
    InsufficientStock,

    /// Uploaded file type not accepted
    UnsupportedFile,

    /// Configuration could not be loaded
    ConfigError,

    /// Rendering or PDF output failed
    RenderError,

    /// File system error
    IoError,

    /// Anything else
    Internal,
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    /// Process exit code: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::NotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidTemplate
            | ErrorCode::TemplateNotFound
            | ErrorCode::InvalidStatus
            | ErrorCode::InsufficientStock
            | ErrorCode::UnsupportedFile => 2,
            ErrorCode::ConfigError
            | ErrorCode::RenderError
            | ErrorCode::IoError
            | ErrorCode::Internal => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = serde_json::to_value(self.code)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self.code));
        write!(f, "error[{}]: {}", code, self.message)
    }
}

impl std::error::Error for CliError {}

/// Converts core errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidStatus { .. } => CliError::new(ErrorCode::InvalidStatus, message),
            CoreError::InsufficientStock { .. } => {
                CliError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::InvalidTemplate { .. } => CliError::new(ErrorCode::InvalidTemplate, message),
            CoreError::Validation(_) => CliError::new(ErrorCode::ValidationError, message),
        }
    }
}

/// Converts store errors to CLI errors.
impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => core.into(),
            StoreError::NotFound { entity, id } => CliError::not_found(entity, &id),
            StoreError::UnsupportedMediaType { .. } => {
                CliError::new(ErrorCode::UnsupportedFile, err.to_string())
            }
            StoreError::Config(_) => CliError::new(ErrorCode::ConfigError, err.to_string()),
            StoreError::Io(_) => CliError::new(ErrorCode::IoError, err.to_string()),
            StoreError::Serialization(_) => {
                CliError::new(ErrorCode::ValidationError, err.to_string())
            }
        }
    }
}

/// Converts rendering errors to CLI errors.
impl From<DocError> for CliError {
    fn from(err: DocError) -> Self {
        let message = err.to_string();
        match err {
            DocError::TemplateNotFound { .. } => CliError::new(ErrorCode::TemplateNotFound, message),
            DocError::CustomTemplateRequired => CliError::new(ErrorCode::ValidationError, message),
            DocError::Io(_) => CliError::new(ErrorCode::IoError, message),
            DocError::Pdf(_) | DocError::Fetch(_) | DocError::PreviewReleased { .. } => {
                tracing::error!("Render failed: {}", message);
                CliError::new(ErrorCode::RenderError, message)
            }
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(ErrorCode::IoError, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::new(ErrorCode::Internal, err.to_string())
    }
}

/// Result type for command handlers.
pub type CliResult<T> = Result<T, CliError>;
