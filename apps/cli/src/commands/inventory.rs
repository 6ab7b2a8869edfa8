//! # Inventory Commands
//!
//! Stock on hand and checkout/return movements.
//!
//! Movements apply to the session's records only; each one is logged and
//! the resulting stock is printed.

use std::fmt;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use suite_core::money::Money;
use suite_core::records::{InventoryItem, InventoryLog, LogType};
use suite_store::StockMovement;

use crate::error::CliResult;
use crate::session::Session;

use super::CommandOutput;

#[derive(Debug, Clone, Subcommand)]
pub enum InventoryCommand {
    /// List items with their stock value
    List,
    /// Take items out of stock
    Checkout(MovementArgs),
    /// Put items back into stock
    Return(MovementArgs),
}

#[derive(Debug, Clone, Args)]
pub struct MovementArgs {
    /// Inventory item id (item-1, ...)
    pub item_id: String,

    pub quantity: i64,

    /// Who moved the stock
    #[arg(long)]
    pub staff: String,

    #[arg(long, default_value = "")]
    pub purpose: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLine {
    pub id: String,
    pub sku: String,
    pub description: String,
    pub quantity: i64,
    pub unit_cost: Money,
    pub stock_value: Money,
}

impl From<&InventoryItem> for StockLine {
    fn from(item: &InventoryItem) -> Self {
        StockLine {
            id: item.id.clone(),
            sku: item.sku.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_cost: item.unit_cost,
            stock_value: item.stock_value(),
        }
    }
}

impl fmt::Display for StockLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<8} {:<12} {:<30} {:>5} x {:>10} = {:>12}",
            self.id,
            self.sku,
            self.description,
            self.quantity,
            self.unit_cost.to_string(),
            self.stock_value.to_string()
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub items: Vec<StockLine>,
    pub total_value: Money,
    /// Set after a checkout or return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<InventoryLog>,
}

impl fmt::Display for InventoryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(log) = &self.log {
            let verb = match log.log_type {
                LogType::Checkout => "checked out",
                LogType::Return => "returned",
            };
            writeln!(
                f,
                "{} {} x {} by {} ({})",
                log.id, log.quantity, log.item_description, log.staff_name, verb
            )?;
        }
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        write!(f, "Total stock value: {}", self.total_value)
    }
}

pub async fn run(session: &mut Session, command: &InventoryCommand) -> CliResult<CommandOutput> {
    let response = match command {
        InventoryCommand::List => list(session),
        InventoryCommand::Checkout(args) => {
            move_stock(session, LogType::Checkout, args, Utc::now())?
        }
        InventoryCommand::Return(args) => move_stock(session, LogType::Return, args, Utc::now())?,
    };
    Ok(CommandOutput::Inventory(response))
}

pub fn list(session: &Session) -> InventoryResponse {
    let items: Vec<StockLine> = session
        .state
        .inventory
        .list()
        .iter()
        .map(StockLine::from)
        .collect();
    let total_value = items.iter().map(|i| i.stock_value).sum();
    InventoryResponse {
        items,
        total_value,
        log: None,
    }
}

pub fn move_stock(
    session: &mut Session,
    log_type: LogType,
    args: &MovementArgs,
    now: DateTime<Utc>,
) -> CliResult<InventoryResponse> {
    let log = session
        .state
        .record_stock_movement(StockMovement {
            item_id: args.item_id.clone(),
            log_type,
            quantity: args.quantity,
            staff_name: args.staff.clone(),
            purpose: args.purpose.clone(),
            date: now.date_naive(),
            now,
        })?
        .clone();

    Ok(InventoryResponse {
        log: Some(log),
        ..list(session)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::session::SessionOptions;

    async fn session() -> Session {
        Session::open(SessionOptions {
            offline: true,
            ephemeral: true,
            ..SessionOptions::default()
        })
        .await
        .unwrap()
    }

    fn args(item: &str, quantity: i64) -> MovementArgs {
        MovementArgs {
            item_id: item.to_string(),
            quantity,
            staff: "Jane Doe".to_string(),
            purpose: "Client install".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_totals_stock_value() {
        let session = session().await;
        let response = list(&session);
        assert_eq!(response.items.len(), 4);
        assert_eq!(response.items[0].stock_value.to_string(), "$17500.00");
        assert!(response.to_string().ends_with("Total stock value: $60350.00"));
    }

    #[tokio::test]
    async fn test_checkout_then_return() {
        let mut session = session().await;
        let now = Utc::now();

        let out = move_stock(&mut session, LogType::Checkout, &args("item-1", 2), now).unwrap();
        assert_eq!(out.items[0].quantity, 3);
        assert_eq!(out.log.as_ref().unwrap().staff_name, "Jane Doe");

        let later = now + chrono::Duration::milliseconds(1);
        let back = move_stock(&mut session, LogType::Return, &args("item-1", 1), later).unwrap();
        assert_eq!(back.items[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_checkout_over_stock_rejected() {
        let mut session = session().await;
        let now = Utc::now();

        let err = move_stock(&mut session, LogType::Checkout, &args("item-1", 50), now).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(list(&session).items[0].quantity, 5);

        let err = move_stock(&mut session, LogType::Checkout, &args("item-9", 1), now).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
