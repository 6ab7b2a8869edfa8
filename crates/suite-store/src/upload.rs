//! # Custom Template Upload
//!
//! Reads a background file from disk and wraps it into a new
//! [`CustomTemplate`] ready to be saved into the company profile.
//!
//! ```text
//!  file on disk ──tokio::fs::read──► sniff magic bytes
//!                                        │
//!            ┌───────────────┬───────────┴──────────┬──────────────────┐
//!            ▼               ▼                      ▼                  ▼
//!           PNG            JPEG              PDF (warn!: not      anything else
//!            │               │               drawn as background)  UnsupportedMediaType
//!            └───────────────┴──────────┬───────────┘
//!                                       ▼
//!                      data:<type>;base64,<payload>
//!                                       ▼
//!                 CustomTemplate { id: custom_<millis>, default placeholders, A4 }
//! ```

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use suite_core::templates::default_placeholders;
use suite_core::types::{CustomTemplate, Dimensions};
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};

/// Media types accepted for template backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Png,
    Jpeg,
    Pdf,
}

impl UploadKind {
    /// Identifies a file by its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(UploadKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(UploadKind::Jpeg)
        } else if bytes.starts_with(b"%PDF") {
            Some(UploadKind::Pdf)
        } else {
            None
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            UploadKind::Png => "image/png",
            UploadKind::Jpeg => "image/jpeg",
            UploadKind::Pdf => "application/pdf",
        }
    }
}

/// An uploaded file encoded as a data URL.
#[derive(Debug, Clone)]
pub struct Upload {
    pub kind: UploadKind,
    pub data_url: String,
    pub size: usize,
}

/// Reads and encodes a template background.
pub async fn read_upload(path: impl AsRef<Path>) -> StoreResult<Upload> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;

    let kind = UploadKind::sniff(&bytes).ok_or_else(|| StoreError::UnsupportedMediaType {
        path: path.display().to_string(),
    })?;

    if kind == UploadKind::Pdf {
        warn!(
            path = %path.display(),
            "PDF backgrounds are stored but not drawn; export a PNG or JPEG for a visible background"
        );
    }

    let data_url = format!("data:{};base64,{}", kind.media_type(), STANDARD.encode(&bytes));
    info!(path = %path.display(), kind = ?kind, bytes = bytes.len(), "Template file read");

    Ok(Upload {
        kind,
        data_url,
        size: bytes.len(),
    })
}

/// Builds a new template around an uploaded background.
///
/// Starts from the default placeholder layout on an A4 page.
pub fn build_custom_template(
    name: impl Into<String>,
    description: Option<String>,
    upload: &Upload,
    now: DateTime<Utc>,
) -> CustomTemplate {
    CustomTemplate {
        id: format!("custom_{}", now.timestamp_millis()),
        name: name.into(),
        description: description.filter(|d| !d.trim().is_empty()),
        template_file: upload.data_url.clone(),
        placeholders: default_placeholders(),
        dimensions: Dimensions::A4,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use suite_core::validation::validate_custom_template;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[tokio::test]
    async fn test_png_upload_becomes_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letterhead.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let upload = read_upload(&path).await.unwrap();
        assert_eq!(upload.kind, UploadKind::Png);
        assert_eq!(upload.size, 8);
        assert!(upload.data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[tokio::test]
    async fn test_pdf_upload_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letterhead.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();

        let upload = read_upload(&path).await.unwrap();
        assert_eq!(upload.kind, UploadKind::Pdf);
        assert!(upload.data_url.starts_with("data:application/pdf;base64,"));
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = read_upload(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedMediaType { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = read_upload("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_built_template_passes_validation() {
        let upload = Upload {
            kind: UploadKind::Jpeg,
            data_url: "data:image/jpeg;base64,/9j/".to_string(),
            size: 3,
        };
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let template = build_custom_template("Letterhead", Some("  ".to_string()), &upload, now);

        assert_eq!(template.id, format!("custom_{}", now.timestamp_millis()));
        assert_eq!(template.description, None);
        assert_eq!(template.dimensions, Dimensions::A4);
        assert!(validate_custom_template(&template).is_empty());
    }
}
