//! Engine errors.
//!
//! Malformed ledger rows never produce an error: they are coerced by the
//! normalizer. Everything here is a caller or configuration mistake and is
//! meant to surface immediately.

use crate::types::VoucherCategory;

/// Configuration and caller errors the engine can surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Averaging strategy name is not `simple` or `weighted`.
    UnknownAveragingStrategy { raw: String },
    /// Position framing name is not `goods_on_hand` or `exposure`.
    UnknownPositionFraming { raw: String },
    /// Voucher category name does not match any category.
    UnknownCategory { raw: String },
    /// Report kind name does not match any report.
    UnknownReportKind { raw: String },
    /// Rate kind name is not `spot`, `custom` or `weighted_average`.
    UnknownRateKind { raw: String },
    /// Field alias override targets a field the normalizer does not know.
    UnknownField { field: String },
    /// A prefix in the voucher table is empty after trimming.
    EmptyPrefix { category: VoucherCategory },
    /// A prefix contains characters other than ASCII letters and digits.
    InvalidPrefix { prefix: String },
    /// The same prefix is mapped to two different categories.
    ConflictingPrefix {
        prefix: String,
        first: VoucherCategory,
        second: VoucherCategory,
    },
    /// A prefix is mapped to `Other`, which is the unmatched fallback.
    PrefixToOther { prefix: String },
    /// Conversion factor must be finite and > 0.
    InvalidConversionFactor { value: f64 },
    /// Local currency multiplier must be finite and > 0.
    InvalidMultiplier { value: f64 },
    /// Rate value must be finite and >= 0.
    InvalidRate { value: f64 },
    /// Statement inputs could not be serialized for hashing.
    Serialize(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAveragingStrategy { raw } => write!(
                f,
                "unknown averaging strategy '{raw}', expected one of: simple | weighted"
            ),
            Self::UnknownPositionFraming { raw } => write!(
                f,
                "unknown position framing '{raw}', expected one of: goods_on_hand | exposure"
            ),
            Self::UnknownCategory { raw } => write!(f, "unknown voucher category '{raw}'"),
            Self::UnknownReportKind { raw } => write!(
                f,
                "unknown report '{raw}', expected one of: \
                 fixing_registry | own_stock | sales_analysis | transaction_summary"
            ),
            Self::UnknownRateKind { raw } => write!(
                f,
                "unknown rate kind '{raw}', expected one of: spot | custom | weighted_average"
            ),
            Self::UnknownField { field } => {
                write!(f, "unknown normalizer field '{field}'")
            }
            Self::EmptyPrefix { category } => {
                write!(f, "voucher table: empty prefix for category {category}")
            }
            Self::InvalidPrefix { prefix } => write!(
                f,
                "voucher table: prefix '{prefix}' must be ASCII letters/digits only"
            ),
            Self::ConflictingPrefix {
                prefix,
                first,
                second,
            } => write!(
                f,
                "voucher table: prefix '{prefix}' mapped to both {first} and {second}"
            ),
            Self::PrefixToOther { prefix } => write!(
                f,
                "voucher table: prefix '{prefix}' cannot map to other (other is the fallback)"
            ),
            Self::InvalidConversionFactor { value } => write!(
                f,
                "rate basis: conversion factor must be finite and > 0, got {value}"
            ),
            Self::InvalidMultiplier { value } => write!(
                f,
                "rate basis: local currency multiplier must be finite and > 0, got {value}"
            ),
            Self::InvalidRate { value } => {
                write!(f, "rate basis: rate must be finite and >= 0, got {value}")
            }
            Self::Serialize(msg) => write!(f, "statement input serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}
