//! # Document Errors
//!
//! Failures of the rendering pipeline.
//!
//! Asset problems are NOT errors here: a logo that cannot be fetched or a
//! background that cannot be used degrades the document and is logged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocError {
    /// The document references an uploaded template the company no longer has.
    #[error("Custom template not found: {id}")]
    TemplateNotFound { id: String },

    /// The built-in renderer was asked to draw the `custom` sentinel.
    #[error("Template 'custom' must be rendered from an uploaded template")]
    CustomTemplateRequired,

    /// printpdf rejected the document.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Export could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The preview buffer was already revoked.
    #[error("Preview {id} has been released")]
    PreviewReleased { id: String },

    /// An image could not be fetched.
    ///
    /// Only surfaces from [`crate::assets::ImageFetcher`] implementations; the
    /// resolver turns it into [`crate::assets::AssetFetch::Failed`].
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Convenience type alias for Results with DocError.
pub type DocResult<T> = Result<T, DocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DocError::TemplateNotFound {
            id: "custom_1".to_string(),
        };
        assert_eq!(err.to_string(), "Custom template not found: custom_1");

        let io: DocError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(io, DocError::Io(_)));
    }
}
