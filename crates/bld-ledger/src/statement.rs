//! Statement assembly: the one place report numbers are computed.
//!
//! The on-screen statement table and the PDF export of a report both call
//! [`build_statement`] with the same raw rows and profile. The returned
//! [`Statement`] carries an `input_hash` over everything that determines its
//! numbers, so a renderer can check it is showing the same computation as
//! another.
//!
//! # Determinism
//! No IO, no clock, no randomness. Equal inputs produce equal statements and
//! equal hashes.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::aggregate::{aggregate, grand_totals, AveragingStrategy, CategoryTotalsMap};
use crate::balance::accumulate;
use crate::classify::VoucherClassifier;
use crate::error::LedgerError;
use crate::normalizer::{normalize, FieldAliases};
use crate::position::{compute_breakdown, PositionBreakdown, PositionFraming};
use crate::types::{BalancedEntry, GrandTotals, RunningState, VoucherCategory};
use crate::valuation::{trading_profit, valuate_position, RateBasis, Valuation};

// ---------------------------------------------------------------------------
// Report profile
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    FixingRegistry,
    OwnStock,
    SalesAnalysis,
    TransactionSummary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::FixingRegistry,
        ReportKind::OwnStock,
        ReportKind::SalesAnalysis,
        ReportKind::TransactionSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::FixingRegistry => "fixing_registry",
            ReportKind::OwnStock => "own_stock",
            ReportKind::SalesAnalysis => "sales_analysis",
            ReportKind::TransactionSummary => "transaction_summary",
        }
    }
}

impl FromStr for ReportKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        ReportKind::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| LedgerError::UnknownReportKind { raw: s.to_string() })
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything besides the rows that decides a report's numbers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportProfile {
    pub report: ReportKind,
    pub averaging_strategy: AveragingStrategy,
    /// `None` frames the position by the opening flag.
    pub framing: Option<PositionFraming>,
    pub exclude_opening: bool,
    pub aliases: FieldAliases,
    pub classifier: VoucherClassifier,
}

impl ReportProfile {
    /// Profile with default aliases and prefix table, opening included.
    ///
    /// The averaging strategy has no default; each report must name one.
    pub fn new(report: ReportKind, averaging_strategy: AveragingStrategy) -> Self {
        Self {
            report,
            averaging_strategy,
            framing: None,
            exclude_opening: false,
            aliases: FieldAliases::default(),
            classifier: VoucherClassifier::standard(),
        }
    }

    pub fn with_framing(mut self, framing: PositionFraming) -> Self {
        self.framing = Some(framing);
        self
    }

    pub fn excluding_opening(mut self, exclude_opening: bool) -> Self {
        self.exclude_opening = exclude_opening;
        self
    }

    pub fn with_aliases(mut self, aliases: FieldAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_classifier(mut self, classifier: VoucherClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Framing actually applied.
    pub fn effective_framing(&self) -> PositionFraming {
        self.framing
            .unwrap_or_else(|| PositionFraming::for_opening_flag(self.exclude_opening))
    }
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

/// All computed numbers for one report run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statement {
    pub report: ReportKind,
    /// SHA-256 hex of the canonical inputs.
    pub input_hash: String,
    pub entries: Vec<BalancedEntry>,
    pub closing: RunningState,
    pub categories: CategoryTotalsMap,
    pub grand_totals: GrandTotals,
    pub breakdown: PositionBreakdown,
    /// Net sales value minus net purchase value.
    pub trading_profit: f64,
    /// Present when a reference rate was supplied.
    pub valuation: Option<Valuation>,
}

impl Statement {
    /// Rows of one category, with their running balances (for per-category tables).
    pub fn entries_in(&self, category: VoucherCategory) -> impl Iterator<Item = &BalancedEntry> {
        self.entries
            .iter()
            .filter(move |b| b.entry.category == category)
    }
}

#[derive(Serialize)]
struct HashInput<'a> {
    profile: &'a ReportProfile,
    framing: PositionFraming,
    market: Option<&'a RateBasis>,
    rows: &'a [Value],
}

/// SHA-256 hex over the canonical JSON of everything [`build_statement`] reads.
pub fn statement_input_hash(
    rows: &[Value],
    profile: &ReportProfile,
    market: Option<&RateBasis>,
) -> Result<String, LedgerError> {
    let input = HashInput {
        profile,
        framing: profile.effective_framing(),
        market,
        rows,
    };
    // Struct fields render in declaration order and JSON objects by key.
    let canonical =
        serde_json::to_string(&input).map_err(|e| LedgerError::Serialize(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Run the whole pipeline for one report.
///
/// Rows are never rejected; errors only come from hashing the inputs.
pub fn build_statement(
    rows: &[Value],
    profile: &ReportProfile,
    market: Option<&RateBasis>,
) -> Result<Statement, LedgerError> {
    let input_hash = statement_input_hash(rows, profile, market)?;

    let normalized = normalize(rows, &profile.aliases, &profile.classifier);
    let accumulated = accumulate(&normalized);
    let categories = aggregate(&normalized, profile.averaging_strategy);
    let grand = grand_totals(&normalized);
    let breakdown = compute_breakdown(
        &categories,
        profile.exclude_opening,
        profile.effective_framing(),
    );
    let profit = trading_profit(breakdown.net_sales.value, breakdown.net_purchase.value);
    let valuation = market.map(|basis| valuate_position(&breakdown.position, basis));

    if grand.unclassified_count > 0 {
        tracing::warn!(
            report = %profile.report,
            rows = grand.unclassified_count,
            "voucher codes matched no prefix; kept in grand totals only"
        );
    }
    if grand.ambiguous_count > 0 {
        tracing::warn!(
            report = %profile.report,
            rows = grand.ambiguous_count,
            "rows with both weight_in and weight_out set; value applied as inward"
        );
    }
    tracing::debug!(
        report = %profile.report,
        entries = accumulated.entries.len(),
        position = ?breakdown.position.status,
        input_hash = %input_hash,
        "statement built"
    );

    Ok(Statement {
        report: profile.report,
        input_hash,
        entries: accumulated.entries,
        closing: accumulated.closing,
        categories,
        grand_totals: grand,
        breakdown,
        trading_profit: profit,
        valuation,
    })
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Memoizes statements by input hash, keeping at most `capacity` of them.
///
/// Purely an optimization: a hit returns exactly what a rebuild would. When
/// full, the least recently used statement is dropped.
#[derive(Debug)]
pub struct StatementCache {
    statements: HashMap<String, Statement>,
    /// Keys from least to most recently used.
    order: VecDeque<String>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for StatementCache {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl StatementCache {
    pub const DEFAULT_CAPACITY: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of 0 is treated as 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            statements: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_build(
        &mut self,
        rows: &[Value],
        profile: &ReportProfile,
        market: Option<&RateBasis>,
    ) -> Result<&Statement, LedgerError> {
        let key = statement_input_hash(rows, profile, market)?;
        if self.statements.contains_key(&key) {
            self.hits += 1;
            self.order.retain(|k| *k != key);
        } else {
            self.misses += 1;
            let statement = build_statement(rows, profile, market)?;
            while self.statements.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.statements.remove(&oldest);
                tracing::debug!(
                    evicted = %oldest,
                    capacity = self.capacity,
                    "statement cache full"
                );
            }
            self.statements.insert(key.clone(), statement);
        }
        self.order.push_back(key.clone());

        match self.statements.entry(key) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(build_statement(rows, profile, market)?)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn clear(&mut self) {
        self.statements.clear();
        self.order.clear();
    }
}
