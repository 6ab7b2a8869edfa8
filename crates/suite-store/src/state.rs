//! # Application State
//!
//! Every record collection the suite works with, owned by one session and
//! mutated through `&mut self` actions.
//!
//! ## Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             AppState                                    │
//! │                                                                         │
//! │  quotations ──convert_quotation──► invoices ──mark_invoice_paid         │
//! │                                                                         │
//! │  inventory ──record_stock_movement──► inventory_logs                    │
//! │                                                                         │
//! │  expenses        staff        company (CompanyProfile, persisted)       │
//! │                                                                         │
//! │  Each collection: get / list / add / update / delete                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the company profile is persisted. Records live for the session and
//! start from seed data plus an optional records file.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use suite_core::pricing::convert_to_invoice;
use suite_core::records::{apply_movement, Expense, InventoryItem, InventoryLog, LogType, StaffMember};
use suite_core::types::{document_id, BillingDocument, Identified, Invoice, Quotation};
use suite_core::validation::validate_document;
use suite_core::{CoreError, ValidationError};
use tracing::{debug, info};

use crate::company::CompanyProfile;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Collection
// =============================================================================

/// An ordered list of records addressed by id.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entity: &'static str,
    records: Vec<T>,
}

impl<T: Identified + Clone> Collection<T> {
    pub fn new(entity: &'static str, records: Vec<T>) -> Self {
        Collection { entity, records }
    }

    pub fn get(&self, id: &str) -> StoreResult<&T> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| self.not_found(id))
    }

    fn get_mut(&mut self, id: &str) -> StoreResult<&mut T> {
        let entity = self.entity;
        self.records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                entity,
                id: id.to_string(),
            })
    }

    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record. Ids are unique within a collection.
    pub fn add(&mut self, record: T) -> StoreResult<()> {
        if self.records.iter().any(|r| r.id() == record.id()) {
            return Err(StoreError::Core(
                ValidationError::Duplicate {
                    field: format!("{} id", self.entity),
                    value: record.id().to_string(),
                }
                .into(),
            ));
        }
        debug!(entity = self.entity, id = record.id(), "Record added");
        self.records.push(record);
        Ok(())
    }

    /// Replaces the record with the same id.
    pub fn update(&mut self, record: T) -> StoreResult<()> {
        let slot = self.get_mut(record.id())?;
        *slot = record;
        Ok(())
    }

    /// Removes and returns the record.
    pub fn delete(&mut self, id: &str) -> StoreResult<T> {
        let index = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| self.not_found(id))?;
        debug!(entity = self.entity, id, "Record deleted");
        Ok(self.records.remove(index))
    }

    /// Replaces records that share an id and appends the rest.
    fn upsert_all(&mut self, records: Vec<T>) {
        for record in records {
            match self.records.iter_mut().find(|r| r.id() == record.id()) {
                Some(slot) => *slot = record,
                None => self.records.push(record),
            }
        }
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            entity: self.entity,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Records File
// =============================================================================

/// JSON records loaded on top of the seed data (`--records file.json`).
///
/// Every collection is optional; field names match the web front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordsFile {
    pub quotations: Vec<Quotation>,
    pub invoices: Vec<Invoice>,
    pub inventory: Vec<InventoryItem>,
    pub inventory_logs: Vec<InventoryLog>,
    pub expenses: Vec<Expense>,
    pub staff: Vec<StaffMember>,
}

impl RecordsFile {
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let mut records: RecordsFile = serde_json::from_str(json)?;
        for quotation in &records.quotations {
            validate_document(quotation).map_err(CoreError::from)?;
        }
        for invoice in &records.invoices {
            validate_document(invoice).map_err(CoreError::from)?;
        }
        // Stored totals are never trusted.
        records.quotations.iter_mut().for_each(Quotation::recalculate);
        records.invoices.iter_mut().for_each(Invoice::recalculate);
        Ok(records)
    }

    pub async fn read(path: impl AsRef<std::path::Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let records = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            quotations = records.quotations.len(),
            invoices = records.invoices.len(),
            "Records file loaded"
        );
        Ok(records)
    }
}

// =============================================================================
// App State
// =============================================================================

/// Session state: record collections plus the persisted company profile.
#[derive(Debug)]
pub struct AppState {
    pub quotations: Collection<Quotation>,
    pub invoices: Collection<Invoice>,
    pub inventory: Collection<InventoryItem>,
    pub inventory_logs: Collection<InventoryLog>,
    pub expenses: Collection<Expense>,
    pub staff: Collection<StaffMember>,
    pub company: CompanyProfile,
}

impl AppState {
    /// Empty collections around a loaded company profile.
    pub fn new(company: CompanyProfile) -> Self {
        Self::from_records(company, RecordsFile::default())
    }

    /// State preloaded with the demo records.
    pub fn seeded(company: CompanyProfile) -> Self {
        Self::from_records(company, crate::seed::records())
    }

    pub fn from_records(company: CompanyProfile, records: RecordsFile) -> Self {
        AppState {
            quotations: Collection::new("Quotation", records.quotations),
            invoices: Collection::new("Invoice", records.invoices),
            inventory: Collection::new("InventoryItem", records.inventory),
            inventory_logs: Collection::new("InventoryLog", records.inventory_logs),
            expenses: Collection::new("Expense", records.expenses),
            staff: Collection::new("StaffMember", records.staff),
            company,
        }
    }

    /// Merges a records file into the current collections.
    pub fn merge(&mut self, records: RecordsFile) {
        self.quotations.upsert_all(records.quotations);
        self.invoices.upsert_all(records.invoices);
        self.inventory.upsert_all(records.inventory);
        self.inventory_logs.upsert_all(records.inventory_logs);
        self.expenses.upsert_all(records.expenses);
        self.staff.upsert_all(records.staff);
    }

    /// Finds a quotation or invoice by id.
    pub fn document(&self, id: &str) -> StoreResult<&dyn BillingDocument> {
        if let Ok(quotation) = self.quotations.get(id) {
            return Ok(quotation as &dyn BillingDocument);
        }
        if let Ok(invoice) = self.invoices.get(id) {
            return Ok(invoice as &dyn BillingDocument);
        }
        Err(StoreError::NotFound {
            entity: "Document",
            id: id.to_string(),
        })
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Creates a draft invoice from an accepted quotation.
    ///
    /// The quotation itself is left unchanged.
    pub fn convert_quotation(
        &mut self,
        quotation_id: &str,
        now: DateTime<Utc>,
        due_days: u32,
    ) -> StoreResult<&Invoice> {
        let quotation = self.quotations.get(quotation_id)?;
        let invoice_id = document_id("inv", now);
        let invoice = convert_to_invoice(quotation, invoice_id.clone(), now.date_naive(), due_days)?;

        self.invoices.add(invoice)?;
        info!(quotation = quotation_id, invoice = %invoice_id, "Quotation converted to invoice");
        self.invoices.get(&invoice_id)
    }

    pub fn mark_invoice_paid(&mut self, invoice_id: &str) -> StoreResult<()> {
        self.invoices.get_mut(invoice_id)?.mark_paid()?;
        info!(invoice = invoice_id, "Invoice marked as paid");
        Ok(())
    }

    /// Checks stock out or back in and appends the audit entry.
    pub fn record_stock_movement(&mut self, movement: StockMovement) -> StoreResult<&InventoryLog> {
        let item = self.inventory.get_mut(&movement.item_id)?;
        let next = apply_movement(item, movement.log_type, movement.quantity)?;
        item.quantity = next;

        let log = InventoryLog {
            id: document_id("log", movement.now),
            item_id: item.id.clone(),
            item_description: item.description.clone(),
            staff_name: movement.staff_name,
            log_type: movement.log_type,
            quantity: movement.quantity,
            purpose: movement.purpose,
            date: movement.date,
        };
        let log_id = log.id.clone();

        info!(
            item = %log.item_id,
            kind = ?log.log_type,
            quantity = log.quantity,
            remaining = next,
            "Stock movement recorded"
        );
        self.inventory_logs.add(log)?;
        self.inventory_logs.get(&log_id)
    }
}

/// Input to [`AppState::record_stock_movement`].
#[derive(Debug, Clone)]
pub struct StockMovement {
    pub item_id: String,
    pub log_type: LogType,
    pub quantity: i64,
    pub staff_name: String,
    pub purpose: String,
    pub date: NaiveDate,
    /// Clock used for the log id.
    pub now: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;
    use suite_core::types::{InvoiceStatus, QuotationStatus};

    fn state() -> AppState {
        AppState::seeded(CompanyProfile::load(Arc::new(MemoryStore::new())))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_seeded_collections() {
        let state = state();
        assert_eq!(state.quotations.len(), 2);
        assert_eq!(state.invoices.len(), 3);
        assert_eq!(state.inventory.len(), 4);
        assert_eq!(state.inventory_logs.len(), 3);
        assert_eq!(state.expenses.len(), 5);
        assert_eq!(state.staff.len(), 3);
    }

    #[test]
    fn test_crud_round() {
        let mut state = state();
        let mut expense = state.expenses.get("exp-1").unwrap().clone();
        expense.description = "Electricity (revised)".to_string();
        state.expenses.update(expense).unwrap();
        assert_eq!(state.expenses.get("exp-1").unwrap().description, "Electricity (revised)");

        let dup = state.expenses.get("exp-2").unwrap().clone();
        assert!(state.expenses.add(dup).is_err());

        state.expenses.delete("exp-1").unwrap();
        assert!(matches!(
            state.expenses.get("exp-1"),
            Err(StoreError::NotFound { entity: "Expense", .. })
        ));
        assert!(state.staff.delete("staff-9").is_err());
    }

    #[test]
    fn test_convert_accepted_quotation() {
        let mut state = state();
        let invoice = state.convert_quotation("q-2024-001", now(), 30).unwrap().clone();

        assert_eq!(invoice.id, format!("inv-{}", now().timestamp_millis()));
        assert_eq!(invoice.quotation_id.as_deref(), Some("q-2024-001"));
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.due_date, NaiveDate::from_ymd_opt(2024, 8, 31).unwrap());
        assert_eq!(state.invoices.len(), 4);
        assert_eq!(
            state.quotations.get("q-2024-001").unwrap().status,
            QuotationStatus::Accepted
        );
    }

    #[test]
    fn test_convert_sent_quotation_fails() {
        let mut state = state();
        let err = state.convert_quotation("q-2024-002", now(), 30).unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::InvalidStatus { .. })));
        assert_eq!(state.invoices.len(), 3);
    }

    #[test]
    fn test_mark_paid() {
        let mut state = state();
        state.mark_invoice_paid("inv-2024-002").unwrap();
        assert_eq!(state.invoices.get("inv-2024-002").unwrap().status, InvoiceStatus::Paid);
        assert!(state.mark_invoice_paid("inv-2024-001").is_err());
    }

    #[test]
    fn test_stock_movement() {
        let mut state = state();
        let movement = |log_type, quantity| StockMovement {
            item_id: "item-1".to_string(),
            log_type,
            quantity,
            staff_name: "John Doe".to_string(),
            purpose: "Rack install".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            now: now(),
        };

        let log = state.record_stock_movement(movement(LogType::Checkout, 2)).unwrap();
        assert_eq!(log.item_description, "Dell PowerEdge R750 Server");
        assert_eq!(state.inventory.get("item-1").unwrap().quantity, 3);

        let err = state.record_stock_movement(movement(LogType::Checkout, 10)).unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::InsufficientStock { .. })));
        assert_eq!(state.inventory.get("item-1").unwrap().quantity, 3);
    }

    #[test]
    fn test_records_file_merges_and_recalculates() {
        let json = r#"{
            "invoices": [{
                "id": "inv-2024-003",
                "customer": { "name": "Innovate Inc.", "address": "789 Innovation Drive, Austin, TX 78701" },
                "date": "2024-06-15",
                "dueDate": "2024-07-15",
                "status": "Overdue",
                "items": [{ "id": "1", "description": "Cloud Migration Service", "quantity": 2, "unitPrice": 6000 }],
                "subtotal": 1,
                "vat": 1,
                "total": 1,
                "terms": "",
                "template": "minimalist",
                "accentColor": "slate"
            }]
        }"#;

        let records = RecordsFile::from_json(json).unwrap();
        let mut state = state();
        state.merge(records);

        let invoice = state.invoices.get("inv-2024-003").unwrap();
        assert_eq!(state.invoices.len(), 3);
        assert_eq!(invoice.total.to_string(), "$12900.00");
    }

    #[test]
    fn test_records_file_rejects_unsafe_id() {
        let json = r#"{
            "quotations": [{
                "id": "../q-1",
                "customer": { "name": "Innovate Inc.", "address": "" },
                "date": "2024-06-15",
                "status": "Draft",
                "items": [],
                "vatRate": 7.5,
                "whtRate": 5,
                "subtotal": 0,
                "vat": 0,
                "total": 0,
                "terms": "",
                "template": "classic",
                "accentColor": "teal"
            }]
        }"#;

        let err = RecordsFile::from_json(json).unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }

    #[test]
    fn test_document_lookup() {
        let state = state();
        assert_eq!(state.document("q-2024-002").unwrap().kind().label(), "Quotation");
        assert_eq!(state.document("inv-2024-001").unwrap().kind().label(), "Invoice");
        assert!(state.document("nope").is_err());
    }
}
