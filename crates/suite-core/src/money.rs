//! # Money Module
//!
//! Provides the `Money` and `Rate` types used by every document amount.
//!
//! ## Why Floating Point Here?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DOCUMENT AMOUNTS                                                       │
//! │                                                                         │
//! │  Quotations and invoices are estimates rendered to paper. Amounts      │
//! │  flow through plain percentage multiplications with NO intermediate    │
//! │  rounding:                                                              │
//! │                                                                         │
//! │    unit price = cost + cost × markup / 100                              │
//! │    vat        = subtotal × vatRate / 100                                │
//! │    total      = subtotal + vat                                          │
//! │                                                                         │
//! │  Rounding happens ONCE, at display time, to 2 decimals with ties       │
//! │  rounded away from zero ($328.125 → $328.13, never banker's $328.12). │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use suite_core::money::{Money, Rate};
//!
//! let line_total = Money::new(125.0).multiply_quantity(2.0); // $250.00
//! let vat = line_total.percent(Rate::from_percent(7.5));     // $18.75
//! assert_eq!((line_total + vat).to_string(), "$268.75");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Currency symbol printed in front of every formatted amount.
pub const CURRENCY_SYMBOL: &str = "$";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in major currency units (dollars).
///
/// ## Design Decisions
/// - **f64**: amounts are derived from user-entered percentages and are
///   never rounded until they are displayed
/// - **Transparent serde**: serializes as a bare JSON number, matching the
///   persisted `subtotal`/`vat`/`total` fields
/// - **Display**: `$268.75`, `-$5.50`
///
/// ## Where Money is Used
/// ```text
/// LineItem.cost_price ──► pricing::unit_price ──► LineItem.unit_price
///                                                      │
///                                     × quantity ──────┘
///                                          │
///                                          ▼
///                           subtotal ──► vat ──► total ──► rendered "$x.xx"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(f64);

impl Money {
    /// Creates a Money value from a major-unit amount.
    #[inline]
    pub const fn new(amount: f64) -> Self {
        Money(amount)
    }

    /// Creates a Money value from user input, coercing anything that is not a
    /// finite, non-negative number to zero.
    ///
    /// ## Example
    /// ```rust
    /// use suite_core::money::Money;
    ///
    /// assert_eq!(Money::sanitize(12.5).amount(), 12.5);
    /// assert_eq!(Money::sanitize(-3.0).amount(), 0.0);
    /// assert_eq!(Money::sanitize(f64::NAN).amount(), 0.0);
    /// ```
    pub fn sanitize(amount: f64) -> Self {
        Money(sanitize_non_negative(amount))
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0.0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use suite_core::money::Money;
    ///
    /// let unit_price = Money::new(125.0);
    /// assert_eq!(unit_price.multiply_quantity(2.0).amount(), 250.0);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: f64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` percent of this amount (`amount × rate / 100`).
    ///
    /// No rounding is applied. `$250.00 × 7.5%` is exactly `18.75`.
    #[inline]
    pub fn percent(&self, rate: Rate) -> Money {
        Money(self.0 * rate.percent() / 100.0)
    }

    /// Adds `markup` percent on top of this amount (`amount + amount × markup / 100`).
    ///
    /// ## Example
    /// ```rust
    /// use suite_core::money::{Money, Rate};
    ///
    /// let selling = Money::new(100.0).apply_markup(Rate::from_percent(25.0));
    /// assert_eq!(selling.amount(), 125.0);
    /// ```
    #[inline]
    pub fn apply_markup(&self, markup: Rate) -> Money {
        *self + self.percent(markup)
    }

    /// Removes `rate` percent from this amount (`amount × (1 - rate / 100)`).
    ///
    /// Used for withholding tax, which is deducted before payment reaches
    /// the seller.
    #[inline]
    pub fn deduct(&self, rate: Rate) -> Money {
        Money(self.0 * (1.0 - rate.percent() / 100.0))
    }

    /// Formats the amount with two decimals and no currency symbol.
    ///
    /// Ties round away from zero, matching how the amounts have always been
    /// printed on documents.
    ///
    /// ## Example
    /// ```rust
    /// use suite_core::money::Money;
    ///
    /// assert_eq!(Money::new(328.125).fixed2(), "328.13");
    /// assert_eq!(Money::new(4375.0).fixed2(), "4375.00");
    /// ```
    pub fn fixed2(&self) -> String {
        format_fixed2(self.0.abs())
    }
}

/// Display shows the amount as printed on documents. Digits are not grouped.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() && format_fixed2(self.0.abs()) != "0.00" {
            "-"
        } else {
            ""
        };
        write!(f, "{}{}{}", sign, CURRENCY_SYMBOL, self.fixed2())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<f64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: f64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate
// =============================================================================

/// A percentage rate (VAT, withholding tax, markup).
///
/// ## Why Not Basis Points?
/// Rates are typed by users as decimals (`7.5`, `14.28`) and echoed back
/// verbatim on documents (`VAT (7.5%)`), so the percentage itself is stored.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Rate(f64);

impl Rate {
    /// Creates a rate from a percentage (`7.5` = 7.5%).
    #[inline]
    pub const fn from_percent(pct: f64) -> Self {
        Rate(pct)
    }

    /// Creates a rate from user input, coercing non-finite or negative values to 0%.
    pub fn sanitize(pct: f64) -> Self {
        Rate(sanitize_non_negative(pct))
    }

    /// Returns the percentage.
    #[inline]
    pub const fn percent(&self) -> f64 {
        self.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0.0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

/// Shows the shortest representation: `7.5`, `10`, `14.28`.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Coerces NaN, infinities and negatives to zero.
pub fn sanitize_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Two-decimal formatting with ties away from zero.
fn format_fixed2(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{:.2}", rounded)
}

// =============================================================================
// Unit Tests
// =============================================================================
