//! # Company Commands
//!
//! Show and edit the company profile printed on every document.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;
use suite_core::CompanyDetails;
use suite_store::CompanyUpdate;
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::session::Session;

use super::CommandOutput;

/// Data-URL logos longer than this are shortened for display.
const LOGO_PREVIEW_LEN: usize = 48;

#[derive(Debug, Clone, Subcommand)]
pub enum CompanyCommand {
    /// Print the current profile
    Show,
    /// Change individual fields
    Set(SetArgs),
    /// Replace the profile with a JSON file
    Import {
        file: PathBuf,
    },
    /// Restore the default profile
    Reset,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SetArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub contact: Option<String>,

    /// http(s) URL or data: URL; empty string removes the logo
    #[arg(long)]
    pub logo_url: Option<String>,

    #[arg(long)]
    pub tagline: Option<String>,
}

impl From<&SetArgs> for CompanyUpdate {
    fn from(args: &SetArgs) -> Self {
        CompanyUpdate {
            name: args.name.clone(),
            address: args.address.clone(),
            contact: args.contact.clone(),
            logo_url: args.logo_url.clone(),
            tagline: args.tagline.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub logo_url: String,
    pub tagline: String,
    pub custom_templates: usize,
}

impl From<&CompanyDetails> for CompanyResponse {
    fn from(d: &CompanyDetails) -> Self {
        CompanyResponse {
            name: d.name.clone(),
            address: d.address.clone(),
            contact: d.contact.clone(),
            logo_url: shorten_logo(&d.logo_url),
            tagline: d.tagline.clone(),
            custom_templates: d.custom_templates.len(),
        }
    }
}

impl fmt::Display for CompanyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        if !self.tagline.is_empty() {
            writeln!(f, "  {}", self.tagline)?;
        }
        writeln!(f, "Address:   {}", self.address)?;
        writeln!(f, "Contact:   {}", self.contact)?;
        let logo = if self.logo_url.is_empty() { "(none)" } else { &self.logo_url };
        writeln!(f, "Logo:      {}", logo)?;
        write!(f, "Templates: {}", self.custom_templates)
    }
}

fn shorten_logo(url: &str) -> String {
    if url.starts_with("data:") && url.len() > LOGO_PREVIEW_LEN {
        let cut = url
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= LOGO_PREVIEW_LEN)
            .last()
            .unwrap_or(0);
        format!("{}... ({} bytes)", &url[..cut], url.len())
    } else {
        url.to_string()
    }
}

pub async fn run(session: &mut Session, command: &CompanyCommand) -> CliResult<CommandOutput> {
    let response = match command {
        CompanyCommand::Show => show(session),
        CompanyCommand::Set(args) => set(session, args)?,
        CompanyCommand::Import { file } => import(session, file).await?,
        CompanyCommand::Reset => reset(session)?,
    };
    Ok(CommandOutput::Company(response))
}

pub fn show(session: &Session) -> CompanyResponse {
    CompanyResponse::from(session.state.company.details())
}

pub fn set(session: &mut Session, args: &SetArgs) -> CliResult<CompanyResponse> {
    let update = CompanyUpdate::from(args);
    if update == CompanyUpdate::default() {
        return Err(CliError::validation("Nothing to update: pass at least one field"));
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(CliError::validation("Company name cannot be empty"));
    }

    session.state.company.update(update)?;
    info!("Company profile updated");
    Ok(show(session))
}

/// Replaces the profile wholesale. Templates in the file are kept as-is.
pub async fn import(session: &mut Session, file: &Path) -> CliResult<CompanyResponse> {
    let json = tokio::fs::read_to_string(file).await?;
    let details: CompanyDetails = serde_json::from_str(&json)
        .map_err(|e| CliError::validation(format!("Invalid company file: {}", e)))?;

    session.state.company.set(details)?;
    info!(file = %file.display(), "Company profile imported");
    Ok(show(session))
}

pub fn reset(session: &mut Session) -> CliResult<CompanyResponse> {
    session.state.company.reset()?;
    Ok(show(session))
}
