use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// Voucher category
// ---------------------------------------------------------------------------

/// Category of a ledger row, derived from its voucher-code prefix.
///
/// `Other` is the fallback for unmatched prefixes: such rows still count in
/// running balances and grand totals but never appear in per-category tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherCategory {
    Purchase,
    PurchaseReturn,
    Sale,
    SaleReturn,
    Receipt,
    Payment,
    Opening,
    Other,
}

impl VoucherCategory {
    /// Every category except `Other`, in table order.
    pub const CLASSIFIED: [VoucherCategory; 7] = [
        VoucherCategory::Purchase,
        VoucherCategory::PurchaseReturn,
        VoucherCategory::Sale,
        VoucherCategory::SaleReturn,
        VoucherCategory::Receipt,
        VoucherCategory::Payment,
        VoucherCategory::Opening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherCategory::Purchase => "purchase",
            VoucherCategory::PurchaseReturn => "purchase_return",
            VoucherCategory::Sale => "sale",
            VoucherCategory::SaleReturn => "sale_return",
            VoucherCategory::Receipt => "receipt",
            VoucherCategory::Payment => "payment",
            VoucherCategory::Opening => "opening",
            VoucherCategory::Other => "other",
        }
    }

    /// Side on which this category naturally moves metal.
    ///
    /// `None` for `Other`, which has no natural direction.
    pub fn natural_side(&self) -> Option<Side> {
        match self {
            VoucherCategory::Purchase
            | VoucherCategory::SaleReturn
            | VoucherCategory::Receipt
            | VoucherCategory::Opening => Some(Side::In),
            VoucherCategory::PurchaseReturn | VoucherCategory::Sale | VoucherCategory::Payment => {
                Some(Side::Out)
            }
            VoucherCategory::Other => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, VoucherCategory::Other)
    }
}

impl FromStr for VoucherCategory {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let cat = match key.as_str() {
            "purchase" => VoucherCategory::Purchase,
            "purchase_return" => VoucherCategory::PurchaseReturn,
            "sale" | "sales" => VoucherCategory::Sale,
            "sale_return" | "sales_return" => VoucherCategory::SaleReturn,
            "receipt" => VoucherCategory::Receipt,
            "payment" => VoucherCategory::Payment,
            "opening" => VoucherCategory::Opening,
            "other" => VoucherCategory::Other,
            _ => {
                return Err(LedgerError::UnknownCategory {
                    raw: s.to_string(),
                })
            }
        };
        Ok(cat)
    }
}

impl std::fmt::Display for VoucherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which side of the ledger a single row moves metal on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    In,
    Out,
    /// Neither weight column is set; value is not applied.
    Flat,
}

impl Side {
    /// +1 for `In`, -1 for `Out`, 0 for `Flat`.
    pub fn sign(self) -> f64 {
        match self {
            Side::In => 1.0,
            Side::Out => -1.0,
            Side::Flat => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction entry
// ---------------------------------------------------------------------------

/// Canonical ledger row produced by the normalizer.
///
/// Weights are pure (fine metal) grams. At most one of `weight_in` /
/// `weight_out` is expected to be nonzero; see [`TransactionEntry::side`] for
/// how rows that set both are read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub voucher_code: String,
    pub category: VoucherCategory,
    pub date: Option<NaiveDate>,
    pub weight_in: f64,
    pub weight_out: f64,
    pub gross_weight_in: f64,
    pub gross_weight_out: f64,
    pub rate: f64,
    pub value: f64,
    pub narration: String,
}

impl TransactionEntry {
    /// Empty entry: all numbers zero, no date, no narration.
    pub fn new<S: Into<String>>(voucher_code: S, category: VoucherCategory) -> Self {
        Self {
            voucher_code: voucher_code.into(),
            category,
            date: None,
            weight_in: 0.0,
            weight_out: 0.0,
            gross_weight_in: 0.0,
            gross_weight_out: 0.0,
            rate: 0.0,
            value: 0.0,
            narration: String::new(),
        }
    }

    /// Metal received: `weight` grams in at `rate`, carrying `value`.
    pub fn inward<S: Into<String>>(
        voucher_code: S,
        category: VoucherCategory,
        weight: f64,
        rate: f64,
        value: f64,
    ) -> Self {
        Self {
            weight_in: weight,
            rate,
            value,
            ..Self::new(voucher_code, category)
        }
    }

    /// Metal delivered: `weight` grams out at `rate`, carrying `value`.
    pub fn outward<S: Into<String>>(
        voucher_code: S,
        category: VoucherCategory,
        weight: f64,
        rate: f64,
        value: f64,
    ) -> Self {
        Self {
            weight_out: weight,
            rate,
            value,
            ..Self::new(voucher_code, category)
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Side this row moves metal on.
    ///
    /// `weight_in` takes precedence when both columns are set.
    pub fn side(&self) -> Side {
        if self.weight_in != 0.0 {
            Side::In
        } else if self.weight_out != 0.0 {
            Side::Out
        } else {
            Side::Flat
        }
    }

    /// Both weight columns are nonzero.
    pub fn is_ambiguous(&self) -> bool {
        self.weight_in != 0.0 && self.weight_out != 0.0
    }

    /// `weight_in - weight_out`.
    pub fn net_weight(&self) -> f64 {
        self.weight_in - self.weight_out
    }

    /// `value` signed by [`side`](Self::side).
    pub fn signed_value(&self) -> f64 {
        self.side().sign() * self.value
    }
}

// ---------------------------------------------------------------------------
// Running balances
// ---------------------------------------------------------------------------

/// Cumulative weight/value balance after a row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningState {
    pub weight_balance: f64,
    pub value_balance: f64,
}

impl RunningState {
    /// State after applying `entry`. Pure; `self` is not modified.
    pub fn apply(self, entry: &TransactionEntry) -> RunningState {
        RunningState {
            weight_balance: self.weight_balance + entry.net_weight(),
            value_balance: self.value_balance + entry.signed_value(),
        }
    }
}

/// A ledger row together with its displayed running balance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalancedEntry {
    pub entry: TransactionEntry,
    pub balance: RunningState,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Per-category totals, netted in the category's natural direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub category: VoucherCategory,
    pub weight_sum: f64,
    pub value_sum: f64,
    pub rate_average: f64,
    pub entry_count: usize,
}

impl CategoryTotals {
    pub fn empty(category: VoucherCategory) -> Self {
        Self {
            category,
            weight_sum: 0.0,
            value_sum: 0.0,
            rate_average: 0.0,
            entry_count: 0,
        }
    }

    pub fn net(&self) -> NetTotals {
        NetTotals::new(self.weight_sum, self.value_sum)
    }
}

/// Totals across every row, classified or not.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GrandTotals {
    pub weight_in: f64,
    pub weight_out: f64,
    /// Σ value of rows on the `In` side.
    pub value_in: f64,
    /// Σ value of rows on the `Out` side.
    pub value_out: f64,
    /// Σ value of `Flat` rows. Kept out of `value_in`/`value_out` and the
    /// running balance, since no weight moved.
    pub value_unapplied: f64,
    pub entry_count: usize,
    /// Rows that fell into `Other`.
    pub unclassified_count: usize,
    /// Rows with both weight columns set.
    pub ambiguous_count: usize,
}

impl GrandTotals {
    pub fn net_weight(&self) -> f64 {
        self.weight_in - self.weight_out
    }

    pub fn net_value(&self) -> f64 {
        self.value_in - self.value_out
    }
}

/// A weight/value pair. Weight and value are always netted independently.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetTotals {
    pub weight: f64,
    pub value: f64,
}

impl NetTotals {
    pub const ZERO: NetTotals = NetTotals {
        weight: 0.0,
        value: 0.0,
    };

    pub fn new(weight: f64, value: f64) -> Self {
        Self { weight, value }
    }
}

impl Add for NetTotals {
    type Output = NetTotals;

    fn add(self, rhs: NetTotals) -> NetTotals {
        NetTotals::new(self.weight + rhs.weight, self.value + rhs.value)
    }
}

impl Sub for NetTotals {
    type Output = NetTotals;

    fn sub(self, rhs: NetTotals) -> NetTotals {
        NetTotals::new(self.weight - rhs.weight, self.value - rhs.value)
    }
}

impl Neg for NetTotals {
    type Output = NetTotals;

    fn neg(self) -> NetTotals {
        NetTotals::new(-self.weight, -self.value)
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Long,
    Short,
}

/// Final long/short position derived from category totals.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub status: PositionStatus,
    pub weight_grams: f64,
    pub value: f64,
    pub average_rate: f64,
}

impl Position {
    /// Position for a netted weight/value pair.
    ///
    /// Zero weight is `Long` with a zero average rate.
    pub fn from_net(net: NetTotals) -> Self {
        // -0.0 + 0.0 == +0.0; keeps negated empty positions from printing as -0.
        let net = NetTotals::new(net.weight + 0.0, net.value + 0.0);
        let status = if net.weight >= 0.0 {
            PositionStatus::Long
        } else {
            PositionStatus::Short
        };
        Self {
            status,
            weight_grams: net.weight,
            value: net.value,
            average_rate: crate::ratio_or_zero(net.value, net.weight),
        }
    }

    pub fn is_long(&self) -> bool {
        self.status == PositionStatus::Long
    }

    pub fn is_short(&self) -> bool {
        self.status == PositionStatus::Short
    }
}
