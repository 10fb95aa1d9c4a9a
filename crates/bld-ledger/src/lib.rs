//! bld-ledger
//!
//! Ledger position & valuation engine for the bullion back-office reports
//! (Fixing Registry, Own Stock, Sales Analysis, Transaction Summary).
//!
//! - Raw report rows are normalized into one canonical entry shape
//! - Running weight/value balances are an explicit left-to-right fold
//! - Category totals are netted by each category's natural direction
//! - Net purchase / net sales / opening give a long or short position
//! - Positions are valued against a selectable rate basis
//! - Pure deterministic logic (no IO, no time, no shared state)
//!
//! [`build_statement`] is the entry point report surfaces should use; the
//! stage functions are public for callers that need one piece.

mod error;
mod types;

pub mod aggregate;
pub mod balance;
pub mod classify;
pub mod normalizer;
pub mod position;
pub mod statement;
pub mod valuation;

pub use aggregate::{aggregate, grand_totals, totals_for, AveragingStrategy, CategoryTotalsMap};
pub use balance::{accumulate, Accumulated};
pub use classify::{VoucherClassifier, DEFAULT_PREFIXES};
pub use error::LedgerError;
pub use normalizer::{coerce_number, normalize, normalize_row, parse_date, FieldAliases};
pub use position::{compute_breakdown, compute_position, net_of, PositionBreakdown, PositionFraming};
pub use statement::{
    build_statement, statement_input_hash, ReportKind, ReportProfile, Statement, StatementCache,
};
pub use valuation::{
    mark_to_market_pnl, trading_profit, valuate, valuate_position, RateBasis, RateKind,
    Valuation, DEFAULT_CONVERSION_FACTOR, DEFAULT_LOCAL_CURRENCY_MULTIPLIER,
};

pub use types::{
    BalancedEntry, CategoryTotals, GrandTotals, NetTotals, Position, PositionStatus,
    RunningState, Side, TransactionEntry, VoucherCategory,
};

/// `numerator / denominator`, or 0 when the denominator is zero or the
/// quotient is not finite.
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let q = numerator / denominator;
    if q.is_finite() {
        q
    } else {
        0.0
    }
}
