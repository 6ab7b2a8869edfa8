//! # Quote Command
//!
//! Drafts a quotation from cost-priced lines and prints its totals.
//!
//! Lines are given as `DESCRIPTION:QUANTITY:COST[:MARKUP]`. Rates and
//! missing markups fall back to the `[documents]` config section. The new
//! quotation lives in the session only; pass `--render` to export it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use suite_core::money::Rate;
use suite_core::types::{document_id, Customer, LineItem, Quotation};
use suite_core::validation::validate_document;
use suite_core::CoreError;
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::session::Session;

use super::documents::{self, RenderResponse, StyleArgs, TotalsResponse};

/// One `--line` value before the markup default is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub description: String,
    pub quantity: f64,
    pub cost: f64,
    pub markup: Option<f64>,
}

impl FromStr for LineSpec {
    type Err = String;

    /// Numbers are taken from the right so descriptions may contain `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numeric = |part: &str| part.trim().parse::<f64>().ok();

        let parts: Vec<&str> = s.rsplitn(4, ':').collect();
        if let [markup, cost, quantity, description] = parts.as_slice() {
            if let (Some(markup), Some(cost), Some(quantity)) =
                (numeric(markup), numeric(cost), numeric(quantity))
            {
                return LineSpec::new(description, quantity, cost, Some(markup));
            }
        }

        let parts: Vec<&str> = s.rsplitn(3, ':').collect();
        match parts.as_slice() {
            [cost, quantity, description] => match (numeric(quantity), numeric(cost)) {
                (Some(quantity), Some(cost)) => LineSpec::new(description, quantity, cost, None),
                _ => Err(format!("quantity and cost must be numbers in '{}'", s)),
            },
            _ => Err(format!("expected DESCRIPTION:QUANTITY:COST[:MARKUP], got '{}'", s)),
        }
    }
}

impl LineSpec {
    fn new(
        description: &str,
        quantity: f64,
        cost: f64,
        markup: Option<f64>,
    ) -> Result<Self, String> {
        let description = description.trim();
        if description.is_empty() {
            return Err("line description cannot be empty".to_string());
        }
        Ok(LineSpec {
            description: description.to_string(),
            quantity,
            cost,
            markup,
        })
    }

    fn to_line_item(&self, default_markup: f64) -> LineItem {
        LineItem::priced(
            self.description.clone(),
            self.quantity,
            self.cost,
            self.markup.unwrap_or(default_markup),
        )
    }
}

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    #[arg(long)]
    pub customer: String,

    #[arg(long, default_value = "")]
    pub address: String,

    /// Line as DESCRIPTION:QUANTITY:COST[:MARKUP]; repeat for more lines
    #[arg(long = "line", value_name = "LINE", required = true)]
    pub lines: Vec<LineSpec>,

    /// VAT percent (default from config)
    #[arg(long)]
    pub vat: Option<f64>,

    /// Withholding tax percent (default from config)
    #[arg(long)]
    pub wht: Option<f64>,

    #[command(flatten)]
    pub style: StyleArgs,

    /// Export the quotation as PDF
    #[arg(long)]
    pub render: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub totals: TotalsResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported: Option<RenderResponse>,
}

impl fmt::Display for QuoteResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.totals)?;
        if let Some(exported) = &self.exported {
            write!(f, "\n{}", exported)?;
        }
        Ok(())
    }
}

pub async fn quote(session: &mut Session, args: &QuoteArgs) -> CliResult<QuoteResponse> {
    let quotation = draft(session, args, Utc::now())?;
    let id = quotation.id.clone();

    let exported = if args.render {
        let exported = session
            .documents
            .export_pdf(&quotation, session.state.company.details(), &session.cancel)
            .await?;
        Some(RenderResponse {
            path: exported.path,
            pages: exported.pages,
            bytes: exported.bytes,
            report: exported.report,
        })
    } else {
        None
    };

    Ok(QuoteResponse {
        totals: documents::totals(session, &id)?,
        exported,
    })
}

/// Builds the quotation, checks it and adds it to the session.
pub fn draft(session: &mut Session, args: &QuoteArgs, now: DateTime<Utc>) -> CliResult<Quotation> {
    let settings = &session.config.documents;
    let vat = args.vat.unwrap_or(settings.default_vat_rate);
    let wht = args.wht.unwrap_or(settings.default_wht_rate);
    for (name, rate) in [("VAT", vat), ("WHT", wht)] {
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(CliError::validation(format!(
                "{} must be between 0 and 100, got {}",
                name, rate
            )));
        }
    }

    let items = args
        .lines
        .iter()
        .map(|line| line.to_line_item(settings.default_markup_percent))
        .collect();
    let mut quotation = Quotation::new(
        document_id("q", now),
        Customer::new(args.customer.trim(), args.address.trim()),
        now.date_naive(),
        items,
        Rate::from_percent(vat),
        Rate::from_percent(wht),
    );

    args.style.apply(
        &mut quotation.template,
        &mut quotation.accent_color,
        &mut quotation.custom_template_id,
    );
    validate_document(&quotation).map_err(CoreError::from)?;

    session.state.quotations.add(quotation.clone())?;
    info!(id = %quotation.id, total = %quotation.total, "Quotation drafted");
    Ok(quotation)
}
