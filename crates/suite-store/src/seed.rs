//! # Seed Data
//!
//! The demo records every fresh session starts with.
//!
//! ## Contents
//! - 2 quotations: `q-2024-001` (Accepted), `q-2024-002` (Sent)
//! - 3 invoices: Paid, Sent and Overdue, two of them converted from the quotations
//! - 4 inventory items with 3 stock movements
//! - 5 expenses across categories
//! - 3 staff members

use chrono::NaiveDate;
use suite_core::money::{Money, Rate};
use suite_core::records::{
    Expense, ExpenseCategory, InventoryItem, InventoryLog, LogType, Role, StaffMember,
};
use suite_core::types::{
    AccentColor, Customer, Invoice, InvoiceStatus, LineItem, Quotation, QuotationStatus,
    TemplateKind,
};

use crate::state::RecordsFile;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn tech_solutions() -> Customer {
    Customer::new("Tech Solutions", "123 Tech Avenue, Silicon Valley, CA 94043")
}

fn global_corp() -> Customer {
    Customer::new("Global Corp", "456 Business Blvd, New York, NY 10001")
}

/// All seeded collections.
pub fn records() -> RecordsFile {
    RecordsFile {
        quotations: quotations(),
        invoices: invoices(),
        inventory: inventory(),
        inventory_logs: inventory_logs(),
        expenses: expenses(),
        staff: staff(),
    }
}

pub fn quotations() -> Vec<Quotation> {
    let vat = Rate::from_percent(suite_core::DEFAULT_QUOTATION_VAT_RATE);
    let wht = Rate::from_percent(suite_core::DEFAULT_WHT_RATE);

    let mut server = Quotation::new(
        "q-2024-001",
        tech_solutions(),
        date(2024, 7, 28),
        vec![LineItem::priced("Dell PowerEdge R750 Server", 1.0, 3500.0, 25.0).with_sku("HW-SRV-001")],
        vat,
        wht,
    );
    server.status = QuotationStatus::Accepted;

    // 3500 cost sold at 4000.
    let mut audit = Quotation::new(
        "q-2024-002",
        global_corp(),
        date(2024, 7, 25),
        vec![LineItem::priced("Network Security Audit", 1.0, 3500.0, 100.0 / 7.0)],
        vat,
        wht,
    );
    audit.status = QuotationStatus::Sent;
    audit.template = TemplateKind::Modern;
    audit.accent_color = AccentColor::Blue;

    vec![server, audit]
}

pub fn invoices() -> Vec<Invoice> {
    let vat = Rate::from_percent(suite_core::DEFAULT_INVOICE_VAT_RATE);
    let due = suite_core::DEFAULT_DUE_DAYS;

    let mut setup = Invoice::new(
        "inv-2024-001",
        tech_solutions(),
        date(2024, 7, 29),
        due,
        vec![LineItem::direct("Server Setup & Configuration", 1.0, 2500.0).with_sku("HW-SRV-001")],
        vat,
    );
    setup.status = InvoiceStatus::Paid;
    setup.quotation_id = Some("q-2024-001".to_string());

    let mut audit = Invoice::new(
        "inv-2024-002",
        global_corp(),
        date(2024, 7, 26),
        due,
        vec![LineItem::direct("Network Security Audit", 1.0, 4000.0)],
        vat,
    );
    audit.status = InvoiceStatus::Sent;
    audit.quotation_id = Some("q-2024-002".to_string());
    audit.template = TemplateKind::Modern;
    audit.accent_color = AccentColor::Blue;

    let mut migration = Invoice::new(
        "inv-2024-003",
        Customer::new("Innovate Inc.", "789 Innovation Drive, Austin, TX 78701"),
        date(2024, 6, 15),
        due,
        vec![LineItem::direct("Cloud Migration Service", 1.0, 6000.0)],
        vat,
    );
    migration.status = InvoiceStatus::Overdue;
    migration.template = TemplateKind::Minimalist;
    migration.accent_color = AccentColor::Slate;

    vec![setup, audit, migration]
}

pub fn inventory() -> Vec<InventoryItem> {
    [
        ("item-1", "HW-SRV-001", "Dell PowerEdge R750 Server", 5, 3500.0),
        ("item-2", "HW-LAP-003", "Lenovo ThinkPad P1", 12, 1800.0),
        ("item-3", "SW-OS-002", "Windows Server 2022 License", 20, 800.0),
        ("item-4", "HW-CAM-005", "Hikvision IP Camera 4MP", 35, 150.0),
    ]
    .into_iter()
    .map(|(id, sku, description, quantity, cost)| InventoryItem {
        id: id.to_string(),
        sku: sku.to_string(),
        description: description.to_string(),
        quantity,
        unit_cost: Money::new(cost),
    })
    .collect()
}

pub fn inventory_logs() -> Vec<InventoryLog> {
    let log = |id: &str, item: (&str, &str), staff: &str, log_type, quantity, purpose: &str, on| {
        InventoryLog {
            id: id.to_string(),
            item_id: item.0.to_string(),
            item_description: item.1.to_string(),
            staff_name: staff.to_string(),
            log_type,
            quantity,
            purpose: purpose.to_string(),
            date: on,
        }
    };
    let laptop = ("item-2", "Lenovo ThinkPad P1");
    let camera = ("item-4", "Hikvision IP Camera 4MP");

    vec![
        log("log-1", laptop, "John Doe", LogType::Checkout, 1, "New client setup", date(2024, 7, 28)),
        log("log-2", camera, "Jane Smith", LogType::Checkout, 5, "Installation at Global Corp", date(2024, 7, 25)),
        log("log-3", laptop, "John Doe", LogType::Return, 1, "Client setup complete", date(2024, 7, 29)),
    ]
}

pub fn expenses() -> Vec<Expense> {
    [
        ("exp-1", date(2024, 7, 22), ExpenseCategory::Utilities, "Monthly Electricity Bill", 150.75),
        ("exp-2", date(2024, 7, 20), ExpenseCategory::Supplies, "Office stationery", 45.5),
        ("exp-3", date(2024, 7, 18), ExpenseCategory::Delivery, "Courier for urgent documents", 25.0),
        ("exp-4", date(2024, 7, 15), ExpenseCategory::Rent, "Office Rent - July", 2500.0),
        ("exp-5", date(2024, 7, 10), ExpenseCategory::Marketing, "Social Media Campaign", 300.0),
    ]
    .into_iter()
    .map(|(id, on, category, description, amount)| Expense {
        id: id.to_string(),
        date: on,
        category,
        description: description.to_string(),
        amount: Money::new(amount),
    })
    .collect()
}

pub fn staff() -> Vec<StaffMember> {
    [
        ("staff-1", "Christiana Hart", Role::Admin, "c.hart@example.com", "(555) 123-4567", 95000.0, date(2022, 1, 15)),
        ("staff-2", "John Doe", Role::SalesRep, "j.doe@example.com", "(555) 987-6543", 72000.0, date(2022, 8, 1)),
        ("staff-3", "Jane Smith", Role::Accountant, "j.smith@example.com", "(555) 555-1212", 80000.0, date(2021, 11, 20)),
    ]
    .into_iter()
    .map(|(id, name, role, email, phone, salary, hired)| StaffMember {
        id: id.to_string(),
        name: name.to_string(),
        role,
        email: email.to_string(),
        phone: phone.to_string(),
        salary: Money::new(salary),
        hire_date: hired,
        avatar_url: format!("https://i.pravatar.cc/150?u={}", id),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_totals() {
        let quotations = quotations();
        assert_eq!(quotations[0].total.to_string(), "$4703.13");
        assert_eq!(quotations[1].total.to_string(), "$4300.00");

        let invoices = invoices();
        assert_eq!(invoices[0].total.to_string(), "$2687.50");
        assert_eq!(invoices[0].due_date, date(2024, 8, 28));
        assert_eq!(invoices[2].total.to_string(), "$6450.00");
    }

    #[test]
    fn test_stock_value() {
        let total: f64 = inventory().iter().map(|i| i.stock_value().amount()).sum();
        assert_eq!(total, 5.0 * 3500.0 + 12.0 * 1800.0 + 20.0 * 800.0 + 35.0 * 150.0);
    }
}
