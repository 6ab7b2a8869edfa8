//! # Template Commands
//!
//! Manage the company's uploaded custom templates.
//!
//! ```text
//!  template add <file> --name N   upload → default placeholders → validate → save
//!  template catalog               built-in templates and accent colours
//!  template list                  id, name, placeholder count
//!  template validate <id>         every problem found, or "valid"
//!  template add-placeholder <id>  free-form custom_<millis> text slot
//!  template remove <id>
//! ```

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use suite_core::templates::{catalog, custom_placeholder};
use suite_core::types::{AccentColor, CustomTemplate, TemplateKind};
use suite_core::validation::validate_custom_template;
use suite_store::{build_custom_template, read_upload, UploadKind};
use tracing::{debug, info};

use crate::error::{CliError, CliResult};
use crate::session::Session;

use super::CommandOutput;

#[derive(Debug, Clone, Subcommand)]
pub enum TemplateCommand {
    /// Upload a PNG, JPEG or PDF background as a new template
    Add(AddArgs),
    /// Show the built-in templates and accent colours
    Catalog,
    /// List uploaded templates
    List,
    /// Check a stored template against the validation rules
    Validate {
        /// Template id (custom_<millis>)
        id: String,
    },
    /// Append a free-form text placeholder
    AddPlaceholder {
        /// Template id (custom_<millis>)
        id: String,
    },
    /// Delete a template
    Remove {
        /// Template id (custom_<millis>)
        id: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Background file
    pub file: PathBuf,

    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,
}

/// One template as shown to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub placeholders: usize,
    pub width: f64,
    pub height: f64,
    pub updated_at: DateTime<Utc>,
}

impl From<&CustomTemplate> for TemplateSummary {
    fn from(t: &CustomTemplate) -> Self {
        TemplateSummary {
            id: t.id.clone(),
            name: t.name.clone(),
            description: t.description.clone(),
            placeholders: t.placeholders.len(),
            width: t.dimensions.width,
            height: t.dimensions.height,
            updated_at: t.updated_at,
        }
    }
}

impl fmt::Display for TemplateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<22} {:<24} {:>2} placeholders  {}x{}pt",
            self.id, self.name, self.placeholders, self.width, self.height
        )
    }
}

/// Result of `add` and `remove`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub action: &'static str,
    pub template: TemplateSummary,
    /// Set when the background will not be drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl fmt::Display for TemplateResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Template {}: {}", self.action, self.template)?;
        if let Some(warning) = &self.warning {
            write!(f, "\nwarning: {}", warning)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}

impl fmt::Display for TemplateListResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.templates.is_empty() {
            return write!(f, "No custom templates");
        }
        let lines: Vec<String> = self.templates.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub kind: TemplateKind,
    pub label: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccentEntry {
    pub accent: AccentColor,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub templates: Vec<CatalogEntry>,
    pub accents: Vec<AccentEntry>,
}

impl fmt::Display for CatalogResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Templates:")?;
        for t in &self.templates {
            writeln!(f, "  {:<12} {}", t.kind.to_string(), t.description)?;
        }
        write!(f, "Accent colours:")?;
        for a in &self.accents {
            write!(f, "\n  {:<12} {}", a.accent.as_str(), a.hex)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResponse {
    pub id: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl fmt::Display for ValidationResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "Template {} is valid", self.id);
        }
        write!(f, "Template {} has {} problem(s):", self.id, self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

pub async fn run(session: &mut Session, command: &TemplateCommand) -> CliResult<CommandOutput> {
    match command {
        TemplateCommand::Add(args) => add(session, args, Utc::now()).await.map(CommandOutput::Template),
        TemplateCommand::Catalog => Ok(CommandOutput::Catalog(builtin_catalog())),
        TemplateCommand::List => Ok(CommandOutput::Templates(list(session))),
        TemplateCommand::Validate { id } => validate(session, id).map(CommandOutput::Validation),
        TemplateCommand::AddPlaceholder { id } => {
            add_placeholder(session, id, Utc::now()).map(CommandOutput::Template)
        }
        TemplateCommand::Remove { id } => remove(session, id).map(CommandOutput::Template),
    }
}

pub async fn add(session: &mut Session, args: &AddArgs, now: DateTime<Utc>) -> CliResult<TemplateResponse> {
    if args.name.trim().is_empty() {
        return Err(CliError::validation("Template name is required"));
    }

    let upload = read_upload(&args.file).await?;
    let template = build_custom_template(args.name.trim(), args.description.clone(), &upload, now);
    let summary = TemplateSummary::from(&template);
    session.state.company.save_template(template)?;

    let warning = (upload.kind == UploadKind::Pdf).then(|| {
        "PDF backgrounds are not drawn; placeholders render on a blank page".to_string()
    });
    info!(template = %summary.id, "Template added");

    Ok(TemplateResponse {
        action: "added",
        template: summary,
        warning,
    })
}

pub fn builtin_catalog() -> CatalogResponse {
    let accents = [
        AccentColor::Teal,
        AccentColor::Blue,
        AccentColor::Crimson,
        AccentColor::Slate,
    ];

    CatalogResponse {
        templates: catalog()
            .iter()
            .map(|t| CatalogEntry {
                kind: t.kind,
                label: t.label,
                description: t.description,
            })
            .collect(),
        accents: accents
            .into_iter()
            .map(|accent| AccentEntry {
                accent,
                hex: accent.color().to_hex(),
            })
            .collect(),
    }
}

pub fn list(session: &Session) -> TemplateListResponse {
    TemplateListResponse {
        templates: session
            .state
            .company
            .details()
            .custom_templates
            .iter()
            .map(TemplateSummary::from)
            .collect(),
    }
}

pub fn validate(session: &Session, id: &str) -> CliResult<ValidationResponse> {
    let template = session
        .state
        .company
        .find_template(id)
        .ok_or_else(|| CliError::not_found("CustomTemplate", id))?;
    let errors = validate_custom_template(template);

    Ok(ValidationResponse {
        id: id.to_string(),
        valid: errors.is_empty(),
        errors,
    })
}

/// Adds a `custom_<millis>` placeholder. It renders as a bracket label.
pub fn add_placeholder(
    session: &mut Session,
    id: &str,
    now: DateTime<Utc>,
) -> CliResult<TemplateResponse> {
    let mut template = session
        .state
        .company
        .find_template(id)
        .cloned()
        .ok_or_else(|| CliError::not_found("CustomTemplate", id))?;
    let placeholder = custom_placeholder(now);
    if template.placeholders.iter().any(|p| p.id == placeholder.id) {
        return Err(CliError::validation(format!(
            "Placeholder {} already exists",
            placeholder.id
        )));
    }

    debug!(template = %id, placeholder = %placeholder.id, "Adding placeholder");
    template.placeholders.push(placeholder);
    template.updated_at = now;
    let summary = TemplateSummary::from(&template);
    session.state.company.save_template(template)?;

    Ok(TemplateResponse {
        action: "updated",
        template: summary,
        warning: None,
    })
}

pub fn remove(session: &mut Session, id: &str) -> CliResult<TemplateResponse> {
    let removed = session.state.company.remove_template(id)?;
    Ok(TemplateResponse {
        action: "removed",
        template: TemplateSummary::from(&removed),
        warning: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::session::SessionOptions;
    use chrono::TimeZone;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    async fn session() -> Session {
        Session::open(SessionOptions {
            offline: true,
            ephemeral: true,
            ..SessionOptions::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_list_validate_remove() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("letterhead.png");
        std::fs::write(&file, PNG_HEADER).unwrap();
        let mut session = session().await;
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();

        let added = add(
            &mut session,
            &AddArgs {
                file,
                name: "Letterhead".to_string(),
                description: None,
            },
            now,
        )
        .await
        .unwrap();
        let id = added.template.id.clone();
        assert_eq!(id, format!("custom_{}", now.timestamp_millis()));
        assert_eq!(added.template.placeholders, 12);
        assert!(added.warning.is_none());

        assert_eq!(list(&session).templates.len(), 1);
        assert!(validate(&session, &id).unwrap().valid);

        let later = now + chrono::Duration::seconds(5);
        let updated = add_placeholder(&mut session, &id, later).unwrap();
        assert_eq!(updated.template.placeholders, 13);
        assert_eq!(updated.template.updated_at, later);
        let again = add_placeholder(&mut session, &id, later).unwrap_err();
        assert_eq!(again.code, ErrorCode::ValidationError);

        remove(&mut session, &id).unwrap();
        assert!(list(&session).templates.is_empty());
        assert_eq!(validate(&session, &id).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_catalog_lists_builtins() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.templates.len(), 5);
        assert!(!catalog.templates.iter().any(|t| t.kind == TemplateKind::Custom));
        let crimson = catalog
            .accents
            .iter()
            .find(|a| a.accent == AccentColor::Crimson)
            .unwrap();
        assert_eq!(crimson.hex, AccentColor::Crimson.hex());
    }

    #[tokio::test]
    async fn test_pdf_upload_warns() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("letterhead.pdf");
        std::fs::write(&file, b"%PDF-1.7\n").unwrap();
        let mut session = session().await;

        let added = add(
            &mut session,
            &AddArgs {
                file,
                name: "PDF letterhead".to_string(),
                description: Some("Scanned".to_string()),
            },
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(added.warning.is_some());
    }

    #[tokio::test]
    async fn test_text_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, b"not an image").unwrap();
        let mut session = session().await;

        let err = add(
            &mut session,
            &AddArgs {
                file,
                name: "Notes".to_string(),
                description: None,
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFile);
        assert!(list(&session).templates.is_empty());
    }
}
