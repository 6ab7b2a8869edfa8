//! # Business Records
//!
//! Inventory, expense and staff records held by the application state next to
//! quotations and invoices. None of these are persisted; they live for the
//! length of a session.
//!
//! ## Stock Movements
//! ```text
//! InventoryItem { quantity: 12 }
//!      │
//!      │  Checkout 5  ──► 12 - 5 = 7   ✓
//!      │  Return   1  ──► 12 + 1 = 13  ✓
//!      │  Checkout 20 ──► 12 - 20 < 0  ✗ InsufficientStock
//!      ▼
//! InventoryLog { type, quantity, itemDescription (copied), ... }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Identified;

// =============================================================================
// Inventory
// =============================================================================

/// A stocked item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryItem {
    pub id: String,
    pub sku: String,
    pub description: String,
    pub quantity: i64,
    pub unit_cost: Money,
}

impl InventoryItem {
    /// `quantity × unit_cost`, shown as "Stock Value".
    pub fn stock_value(&self) -> Money {
        self.unit_cost.multiply_quantity(self.quantity as f64)
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum LogType {
    Checkout,
    Return,
}

/// Audit entry for a stock movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryLog {
    pub id: String,
    pub item_id: String,
    /// Copied from the item at movement time.
    pub item_description: String,
    pub staff_name: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub quantity: i64,
    pub purpose: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
}

/// Computes the stock level after a movement.
///
/// Checkouts may not take more than is on hand. The quantity must be
/// positive.
pub fn apply_movement(item: &InventoryItem, log_type: LogType, quantity: i64) -> CoreResult<i64> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }

    let next = match log_type {
        LogType::Checkout => item.quantity - quantity,
        LogType::Return => item.quantity + quantity,
    };

    if next < 0 {
        return Err(CoreError::InsufficientStock {
            sku: item.sku.clone(),
            available: item.quantity,
            requested: quantity,
        });
    }

    Ok(next)
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Salaries,
    Marketing,
    Supplies,
    Travel,
    Delivery,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Expense {
    pub id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Money,
}

// =============================================================================
// Staff
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Role {
    Admin,
    Manager,
    Accountant,
    #[serde(rename = "Sales Rep")]
    SalesRep,
    Technician,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub email: String,
    pub phone: String,
    /// Annual salary.
    pub salary: Money,
    #[ts(as = "String")]
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub avatar_url: String,
}

impl Identified for InventoryItem {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for InventoryLog {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for StaffMember {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thinkpad() -> InventoryItem {
        InventoryItem {
            id: "item-2".to_string(),
            sku: "HW-LAP-003".to_string(),
            description: "Lenovo ThinkPad P1".to_string(),
            quantity: 12,
            unit_cost: Money::new(1800.0),
        }
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(thinkpad().stock_value().to_string(), "$21600.00");
    }

    #[test]
    fn test_apply_movement() {
        let item = thinkpad();
        assert_eq!(apply_movement(&item, LogType::Checkout, 5).unwrap(), 7);
        assert_eq!(apply_movement(&item, LogType::Return, 1).unwrap(), 13);
        assert_eq!(apply_movement(&item, LogType::Checkout, 12).unwrap(), 0);
    }

    #[test]
    fn test_checkout_beyond_stock_fails() {
        let err = apply_movement(&thinkpad(), LogType::Checkout, 20).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 12, requested: 20, .. }
        ));
        assert!(apply_movement(&thinkpad(), LogType::Return, 0).is_err());
    }

    #[test]
    fn test_role_serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&Role::SalesRep).unwrap(), "\"Sales Rep\"");
        let log: InventoryLog = serde_json::from_str(
            r#"{"id":"log-1","itemId":"item-2","itemDescription":"Lenovo ThinkPad P1",
                "staffName":"John Doe","type":"Checkout","quantity":1,
                "purpose":"New client setup","date":"2024-07-28"}"#,
        )
        .unwrap();
        assert_eq!(log.log_type, LogType::Checkout);
    }
}
