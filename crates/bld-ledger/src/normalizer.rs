//! Raw report rows -> canonical [`TransactionEntry`] values.
//!
//! Every report API returns ledger rows with its own field names
//! (`pureWtIn` vs `stockIn`, `amountValue` vs `value`, ...). This module
//! resolves each canonical field through an ordered alias list and coerces
//! the result.
//!
//! It never fails and never drops a row:
//! - numbers follow `Number(x) || 0` semantics (see [`coerce_number`])
//! - unknown dates become `None`
//! - unmatched voucher codes become [`VoucherCategory::Other`]

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::classify::VoucherClassifier;
use crate::error::LedgerError;
use crate::types::{TransactionEntry, VoucherCategory};

// ---------------------------------------------------------------------------
// Field aliases
// ---------------------------------------------------------------------------

/// Ordered alias lists, one per canonical field.
///
/// Earlier names win: put the report-specific name first and generic
/// fallbacks after it. Missing keys in configuration keep the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldAliases {
    pub voucher_code: Vec<String>,
    pub date: Vec<String>,
    pub weight_in: Vec<String>,
    pub weight_out: Vec<String>,
    pub gross_weight_in: Vec<String>,
    pub gross_weight_out: Vec<String>,
    pub rate: Vec<String>,
    pub value: Vec<String>,
    pub narration: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            voucher_code: names(&["voucherCode", "vocNo", "voucherNo", "voucher"]),
            date: names(&["vocDate", "voucherDate", "date"]),
            weight_in: names(&["pureWtIn", "stockIn", "weightIn"]),
            weight_out: names(&["pureWtOut", "stockOut", "weightOut"]),
            gross_weight_in: names(&["grossWtIn", "grossWeightIn"]),
            gross_weight_out: names(&["grossWtOut", "grossWeightOut"]),
            rate: names(&["rate", "fixingRate", "metalRate"]),
            value: names(&["amountValue", "value", "amount"]),
            narration: names(&["narration", "remarks", "description"]),
        }
    }
}

impl FieldAliases {
    /// Replace the alias list of one canonical field (snake_case name).
    pub fn with_override<I, S>(mut self, field: &str, aliases: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = aliases.into_iter().map(Into::into).collect();
        let slot = match field {
            "voucher_code" => &mut self.voucher_code,
            "date" => &mut self.date,
            "weight_in" => &mut self.weight_in,
            "weight_out" => &mut self.weight_out,
            "gross_weight_in" => &mut self.gross_weight_in,
            "gross_weight_out" => &mut self.gross_weight_out,
            "rate" => &mut self.rate,
            "value" => &mut self.value,
            "narration" => &mut self.narration,
            other => {
                return Err(LedgerError::UnknownField {
                    field: other.to_string(),
                })
            }
        };
        *slot = list;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Coerce a JSON value to a number the way `Number(x) || 0` does.
///
/// - numbers pass through
/// - strings are trimmed and parsed; empty strings are 0
/// - unsigned `0x`/`0o`/`0b` strings parse as hex, octal and binary integers
/// - `true` is 1, `false` is 0
/// - null, arrays, objects, unparseable text, NaN and infinities are 0
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else if let Some(n) = parse_radix_literal(t) {
                n
            } else {
                t.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// `Some` for any string with a radix prefix; malformed digits give 0.
fn parse_radix_literal(t: &str) -> Option<f64> {
    let (radix, digits) = match t.get(..2)? {
        "0x" | "0X" => (16, &t[2..]),
        "0o" | "0O" => (8, &t[2..]),
        "0b" | "0B" => (2, &t[2..]),
        _ => return None,
    };
    let n = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(n.unwrap_or(0.0))
}

/// Coerce a JSON value to display text. Numbers are rendered, everything
/// else that is not a string is empty.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Parse a report date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, naive `YYYY-MM-DDThh:mm:ss`
/// timestamps and `DD/MM/YYYY`. Anything else is `None`.
pub fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    let s = match value {
        Some(Value::String(s)) => s.trim(),
        _ => return None,
    };

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    if let Some(Ok(d)) = s.get(..10).map(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d")) {
        return Some(d);
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// First alias present with a non-null value.
fn lookup<'a>(row: &'a Map<String, Value>, aliases: &[String]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| row.get(name))
        .find(|v| !v.is_null())
}

/// Normalize one raw row. Non-object rows yield an empty `Other` entry.
pub fn normalize_row(
    row: &Value,
    aliases: &FieldAliases,
    classifier: &VoucherClassifier,
) -> TransactionEntry {
    let Some(obj) = row.as_object() else {
        return TransactionEntry::new("", VoucherCategory::Other);
    };

    let voucher_code = coerce_text(lookup(obj, &aliases.voucher_code));
    let category = classifier.classify(&voucher_code);

    TransactionEntry {
        category,
        date: parse_date(lookup(obj, &aliases.date)),
        weight_in: coerce_number(lookup(obj, &aliases.weight_in)),
        weight_out: coerce_number(lookup(obj, &aliases.weight_out)),
        gross_weight_in: coerce_number(lookup(obj, &aliases.gross_weight_in)),
        gross_weight_out: coerce_number(lookup(obj, &aliases.gross_weight_out)),
        rate: coerce_number(lookup(obj, &aliases.rate)),
        value: coerce_number(lookup(obj, &aliases.value)),
        narration: coerce_text(lookup(obj, &aliases.narration)),
        voucher_code,
    }
}

/// Normalize a batch of raw rows, preserving order and count.
pub fn normalize(
    rows: &[Value],
    aliases: &FieldAliases,
    classifier: &VoucherClassifier,
) -> Vec<TransactionEntry> {
    let entries: Vec<TransactionEntry> = rows
        .iter()
        .map(|row| normalize_row(row, aliases, classifier))
        .collect();

    tracing::debug!(rows = entries.len(), "normalized ledger rows");
    entries
}
