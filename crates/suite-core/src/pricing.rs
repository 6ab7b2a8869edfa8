//! # Pricing & Tax Calculator
//!
//! Derives unit prices, subtotals, VAT, totals and profit from line items.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Document Calculation                              │
//! │                                                                         │
//! │  LineItem { qty: 2, cost: $100, markup: 25% }                           │
//! │       │                                                                 │
//! │       │  unit = cost + cost × markup / 100          = $125.00           │
//! │       │  line = qty × unit                          = $250.00           │
//! │       ▼                                                                 │
//! │  subtotal = Σ line                                  = $250.00           │
//! │  vat      = subtotal × vatRate / 100   (7.5%)       = $18.75            │
//! │  total    = subtotal + vat                          = $268.75           │
//! │                                                                         │
//! │  profit   = Σ (line × (1 - wht/100) - cost × qty)   (quotations only)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Input Hardening
//! Negative, missing or non-finite numbers are coerced to zero on the way
//! in. A total is never NaN.

use chrono::{Days, NaiveDate};

use crate::error::{CoreError, CoreResult};
use crate::money::{sanitize_non_negative, Money, Rate};
use crate::types::{
    AccentColor, Customer, Invoice, InvoiceStatus, LineItem, Quotation, QuotationStatus,
    TemplateKind,
};

/// Terms printed on new quotations.
pub const QUOTATION_TERMS: &str = "1. All prices are exclusive of applicable taxes.
2. This quotation is valid for 30 days from the date of issue.
3. Payment terms: 50% advance, 50% upon completion.";

/// Terms printed on new invoices.
pub const INVOICE_TERMS: &str = "1. Payment is due within 30 days of the invoice date.
2. Late payments are subject to a 1.5% monthly interest charge.
3. Please make all checks payable to Your Company Name.";

// =============================================================================
// Line Pricing
// =============================================================================

/// Selling price for one unit: `cost + cost × markup / 100`.
///
/// ## Example
/// ```rust
/// use suite_core::money::{Money, Rate};
/// use suite_core::pricing::unit_price;
///
/// let price = unit_price(Money::new(100.0), Rate::from_percent(25.0));
/// assert_eq!(price.amount(), 125.0);
/// ```
#[inline]
pub fn unit_price(cost: Money, markup: Rate) -> Money {
    cost.apply_markup(markup)
}

/// Returns a copy of `item` with sanitized inputs and a derived unit price.
///
/// Lines priced from cost and markup get `unit_price` recomputed; a missing
/// cost or markup counts as zero. Lines without either keep their entered
/// unit price.
pub fn price_line(item: &LineItem) -> LineItem {
    let mut priced = item.clone();
    priced.quantity = sanitize_non_negative(item.quantity);

    if item.has_cost_pricing() {
        let cost = Money::sanitize(item.cost_price.unwrap_or_default().amount());
        let markup = Rate::sanitize(item.markup_percent.unwrap_or_default());
        priced.cost_price = Some(cost);
        priced.markup_percent = Some(markup.percent());
        priced.unit_price = unit_price(cost, markup);
    } else {
        priced.unit_price = Money::sanitize(item.unit_price.amount());
    }

    priced
}

// =============================================================================
// Document Totals
// =============================================================================

/// Tax rates applied to a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub vat: Rate,
    /// Withholding tax. Present for quotations, which enables profit.
    pub wht: Option<Rate>,
}

impl Rates {
    pub fn quotation(vat: Rate, wht: Rate) -> Self {
        Rates {
            vat: Rate::sanitize(vat.percent()),
            wht: Some(Rate::sanitize(wht.percent())),
        }
    }

    pub fn invoice(vat: Rate) -> Self {
        Rates {
            vat: Rate::sanitize(vat.percent()),
            wht: None,
        }
    }
}

/// Result of running the calculator over a set of lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    /// Lines with derived unit prices.
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub vat: Money,
    pub total: Money,
    /// Estimated profit after withholding tax; `None` without a WHT rate.
    pub profit: Option<Money>,
}

/// Computes `{ items, subtotal, vat, total, profit? }`.
///
/// No intermediate rounding is applied.
pub fn calculate(items: &[LineItem], rates: Rates) -> Calculation {
    let items: Vec<LineItem> = items.iter().map(price_line).collect();
    let vat_rate = Rate::sanitize(rates.vat.percent());

    let subtotal: Money = items.iter().map(LineItem::line_total).sum();
    let vat = subtotal.percent(vat_rate);
    let total = subtotal + vat;
    let profit = rates
        .wht
        .map(|wht| profit(&items, Rate::sanitize(wht.percent())));

    Calculation {
        items,
        subtotal,
        vat,
        total,
        profit,
    }
}

/// `Σ(line_total × (1 - wht/100) - cost_price × quantity)`.
///
/// Lines without a cost price contribute their full net amount.
pub fn profit(items: &[LineItem], wht: Rate) -> Money {
    items
        .iter()
        .map(|item| item.line_total().deduct(wht) - item.line_cost())
        .sum()
}

/// `date + days`, saturating at the input date if the calendar overflows.
pub fn default_due_date(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(date)
}

// =============================================================================
// Quotations
// =============================================================================

impl Quotation {
    /// Builds a draft quotation and computes its totals.
    pub fn new(
        id: impl Into<String>,
        customer: Customer,
        date: NaiveDate,
        items: Vec<LineItem>,
        vat_rate: Rate,
        wht_rate: Rate,
    ) -> Self {
        let mut quotation = Quotation {
            id: id.into(),
            customer,
            date,
            status: QuotationStatus::Draft,
            items,
            vat_rate,
            wht_rate,
            subtotal: Money::zero(),
            vat: Money::zero(),
            total: Money::zero(),
            terms: QUOTATION_TERMS.to_string(),
            template: TemplateKind::default(),
            accent_color: AccentColor::default(),
            custom_template_id: None,
        };
        quotation.recalculate();
        quotation
    }

    /// Re-derives unit prices and totals from the lines and rates.
    pub fn recalculate(&mut self) {
        let rates = Rates::quotation(self.vat_rate, self.wht_rate);
        let calc = calculate(&self.items, rates);
        self.vat_rate = rates.vat;
        self.wht_rate = rates.wht.unwrap_or_default();
        self.items = calc.items;
        self.subtotal = calc.subtotal;
        self.vat = calc.vat;
        self.total = calc.total;
    }

    /// Estimated profit after withholding tax. Never persisted.
    pub fn profit(&self) -> Money {
        let items: Vec<LineItem> = self.items.iter().map(price_line).collect();
        profit(&items, Rate::sanitize(self.wht_rate.percent()))
    }
}

/// Converts an accepted quotation into a draft invoice.
///
/// ## Rules
/// - Only `Accepted` quotations convert
/// - Lines keep description, quantity, unit price and SKU; cost data is dropped
/// - VAT rate and totals carry over unchanged
/// - `quotation_id` points back at the source; the quotation is not touched
pub fn convert_to_invoice(
    quotation: &Quotation,
    invoice_id: impl Into<String>,
    today: NaiveDate,
    due_days: u32,
) -> CoreResult<Invoice> {
    if quotation.status != QuotationStatus::Accepted {
        return Err(CoreError::InvalidStatus {
            entity: "Quotation",
            id: quotation.id.clone(),
            status: format!("{:?}", quotation.status),
            operation: "convert to invoice",
        });
    }

    let items = quotation
        .items
        .iter()
        .map(|item| LineItem {
            id: item.id.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            cost_price: None,
            markup_percent: None,
            unit_price: item.unit_price,
            sku: item.sku.clone(),
        })
        .collect();

    Ok(Invoice {
        id: invoice_id.into(),
        customer: quotation.customer.clone(),
        date: today,
        due_date: default_due_date(today, due_days),
        status: InvoiceStatus::Draft,
        items,
        vat_rate: quotation.vat_rate,
        subtotal: quotation.subtotal,
        vat: quotation.vat,
        total: quotation.total,
        terms: INVOICE_TERMS.to_string(),
        quotation_id: Some(quotation.id.clone()),
        template: quotation.template,
        accent_color: quotation.accent_color,
        custom_template_id: quotation.custom_template_id.clone(),
    })
}

// =============================================================================
// Invoices
// =============================================================================

impl Invoice {
    /// Builds a draft invoice due `due_days` after `date`.
    pub fn new(
        id: impl Into<String>,
        customer: Customer,
        date: NaiveDate,
        due_days: u32,
        items: Vec<LineItem>,
        vat_rate: Rate,
    ) -> Self {
        let mut invoice = Invoice {
            id: id.into(),
            customer,
            date,
            due_date: default_due_date(date, due_days),
            status: InvoiceStatus::Draft,
            items,
            vat_rate,
            subtotal: Money::zero(),
            vat: Money::zero(),
            total: Money::zero(),
            terms: INVOICE_TERMS.to_string(),
            quotation_id: None,
            template: TemplateKind::default(),
            accent_color: AccentColor::default(),
            custom_template_id: None,
        };
        invoice.recalculate();
        invoice
    }

    /// Re-derives totals from the lines and the invoice's VAT rate.
    pub fn recalculate(&mut self) {
        let rates = Rates::invoice(self.vat_rate);
        let calc = calculate(&self.items, rates);
        self.vat_rate = rates.vat;
        self.items = calc.items;
        self.subtotal = calc.subtotal;
        self.vat = calc.vat;
        self.total = calc.total;
    }

    /// Moves the invoice to `Paid`.
    pub fn mark_paid(&mut self) -> CoreResult<()> {
        if self.status == InvoiceStatus::Paid {
            return Err(CoreError::InvalidStatus {
                entity: "Invoice",
                id: self.id.clone(),
                status: "Paid".to_string(),
                operation: "mark as paid",
            });
        }
        self.status = InvoiceStatus::Paid;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn server_quotation() -> Quotation {
        let mut q = Quotation::new(
            "q-2024-001",
            Customer::new("Tech Solutions", "123 Tech Avenue, Silicon Valley, CA 94043"),
            date(2024, 7, 28),
            vec![LineItem::priced("Dell PowerEdge R750 Server", 1.0, 3500.0, 25.0)
                .with_sku("HW-SRV-001")],
            Rate::from_percent(7.5),
            Rate::from_percent(5.0),
        );
        q.status = QuotationStatus::Accepted;
        q
    }

    #[test]
    fn test_unit_price_from_markup() {
        let item = price_line(&LineItem::priced("Widget", 2.0, 100.0, 25.0));
        assert_eq!(item.unit_price.amount(), 125.0);
        assert_eq!(item.line_total().amount(), 250.0);
    }

    #[test]
    fn test_quotation_totals() {
        let q = Quotation::new(
            "q-1",
            Customer::default(),
            date(2024, 7, 28),
            vec![LineItem::priced("Widget", 2.0, 100.0, 25.0)],
            Rate::from_percent(7.5),
            Rate::from_percent(5.0),
        );
        assert_eq!(q.subtotal.amount(), 250.0);
        assert_eq!(q.vat.amount(), 18.75);
        assert_eq!(q.total.amount(), 268.75);
        assert_eq!(q.total.to_string(), "$268.75");
    }

    #[test]
    fn test_unit_price_identity_holds() {
        for (cost, markup) in [(0.0, 0.0), (3500.0, 14.28), (19.99, 33.3), (1.0, 250.0)] {
            let item = price_line(&LineItem::priced("x", 1.0, cost, markup));
            let expected = cost * (1.0 + markup / 100.0);
            assert!((item.unit_price.amount() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_profit_after_withholding() {
        let q = server_quotation();
        // 4375 × 0.95 - 3500
        assert!((q.profit().amount() - 656.25).abs() < 1e-9);

        let calc = calculate(&q.items, Rates::quotation(q.vat_rate, q.wht_rate));
        assert_eq!(calc.profit, Some(q.profit()));
        assert_eq!(calculate(&q.items, Rates::invoice(q.vat_rate)).profit, None);
    }

    #[test]
    fn test_bad_numbers_are_coerced_to_zero() {
        let mut item = LineItem::priced("Broken", f64::NAN, -5.0, f64::INFINITY);
        item.cost_price = Some(Money::new(f64::NAN));
        let calc = calculate(
            &[item, LineItem::direct("Ok", 1.0, 10.0)],
            Rates::quotation(Rate::from_percent(f64::NAN), Rate::from_percent(-3.0)),
        );
        assert_eq!(calc.items[0].quantity, 0.0);
        assert_eq!(calc.items[0].unit_price, Money::zero());
        assert_eq!(calc.subtotal.amount(), 10.0);
        assert_eq!(calc.vat, Money::zero());
        assert_eq!(calc.total.amount(), 10.0);
        assert!(!calc.profit.unwrap().amount().is_nan());
    }

    #[test]
    fn test_missing_markup_counts_as_zero() {
        let mut item = LineItem::priced("Cable", 3.0, 10.0, 0.0);
        item.markup_percent = None;
        assert_eq!(price_line(&item).unit_price.amount(), 10.0);
    }

    #[test]
    fn test_zero_items() {
        let calc = calculate(&[], Rates::quotation(Rate::from_percent(7.5), Rate::from_percent(5.0)));
        assert!(calc.items.is_empty());
        assert_eq!(calc.subtotal, Money::zero());
        assert_eq!(calc.vat, Money::zero());
        assert_eq!(calc.total, Money::zero());
    }

    #[test]
    fn test_invoice_uses_own_vat_rate() {
        let invoice = Invoice::new(
            "inv-1",
            Customer::new("Global Corp", "456 Business Blvd"),
            date(2024, 7, 26),
            30,
            vec![LineItem::direct("Network Security Audit", 1.0, 4000.0)],
            Rate::from_percent(7.5),
        );
        assert_eq!(invoice.vat.amount(), 300.0);
        assert_eq!(invoice.total.amount(), 4300.0);
        assert_eq!(invoice.due_date, date(2024, 8, 25));
    }

    #[test]
    fn test_convert_accepted_quotation() {
        let q = server_quotation();
        let inv = convert_to_invoice(&q, "inv-100", date(2024, 8, 1), 30).unwrap();

        assert_eq!(inv.items.len(), q.items.len());
        for (a, b) in inv.items.iter().zip(&q.items) {
            assert_eq!(a.description, b.description);
            assert_eq!(a.quantity, b.quantity);
            assert_eq!(a.unit_price, b.unit_price);
            assert_eq!(a.sku, b.sku);
            assert!(a.cost_price.is_none());
        }
        assert_eq!(inv.subtotal, q.subtotal);
        assert_eq!(inv.vat, q.vat);
        assert_eq!(inv.total, q.total);
        assert_eq!(inv.quotation_id.as_deref(), Some("q-2024-001"));
        assert_eq!(inv.status, InvoiceStatus::Draft);
        assert_eq!(inv.due_date, date(2024, 8, 31));
        assert_eq!(inv.terms, INVOICE_TERMS);
    }

    #[test]
    fn test_convert_requires_accepted() {
        let mut q = server_quotation();
        q.status = QuotationStatus::Sent;
        let err = convert_to_invoice(&q, "inv-100", date(2024, 8, 1), 30).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus { .. }));
    }

    #[test]
    fn test_mark_paid_twice_fails() {
        let mut inv = Invoice::new("inv-1", Customer::default(), date(2024, 1, 1), 30, vec![], Rate::from_percent(7.5));
        inv.mark_paid().unwrap();
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert!(inv.mark_paid().is_err());
    }
}
