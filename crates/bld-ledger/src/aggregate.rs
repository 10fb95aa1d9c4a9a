//! Per-category and grand totals.
//!
//! Category sums are netted in the category's natural direction: a purchase
//! row bringing metal in adds to the purchase total, a purchase row sending
//! metal out subtracts from it. A row with a value but no weight counts in
//! the category's own direction. `Other` rows are left out of the category
//! map and only show up in [`GrandTotals`].

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::types::{CategoryTotals, GrandTotals, Side, TransactionEntry, VoucherCategory};

/// Category totals keyed by category, in category order.
pub type CategoryTotalsMap = BTreeMap<VoucherCategory, CategoryTotals>;

/// How `rate_average` is computed for a category.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingStrategy {
    /// Mean of the nonzero `rate` fields.
    Simple,
    /// `value_sum / weight_sum`.
    Weighted,
}

impl AveragingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AveragingStrategy::Simple => "simple",
            AveragingStrategy::Weighted => "weighted",
        }
    }
}

impl FromStr for AveragingStrategy {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(AveragingStrategy::Simple),
            "weighted" => Ok(AveragingStrategy::Weighted),
            _ => Err(LedgerError::UnknownAveragingStrategy { raw: s.to_string() }),
        }
    }
}

impl std::fmt::Display for AveragingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct Running {
    weight: f64,
    value: f64,
    rate_sum: f64,
    rate_count: usize,
    entries: usize,
}

/// Compute totals for every classified category present in `entries`.
pub fn aggregate(entries: &[TransactionEntry], strategy: AveragingStrategy) -> CategoryTotalsMap {
    let mut running: BTreeMap<VoucherCategory, Running> = BTreeMap::new();

    for entry in entries {
        let Some(natural) = entry.category.natural_side() else {
            continue;
        };
        let direction = natural.sign();

        let acc = running.entry(entry.category).or_default();
        acc.weight += direction * entry.net_weight();
        acc.value += match entry.side() {
            // No weight moved; the value counts in the category's own direction.
            Side::Flat => entry.value,
            _ => direction * entry.signed_value(),
        };
        if entry.rate != 0.0 {
            acc.rate_sum += entry.rate;
            acc.rate_count += 1;
        }
        acc.entries += 1;
    }

    let totals: CategoryTotalsMap = running
        .into_iter()
        .map(|(category, acc)| {
            let rate_average = match strategy {
                AveragingStrategy::Simple => {
                    crate::ratio_or_zero(acc.rate_sum, acc.rate_count as f64)
                }
                AveragingStrategy::Weighted => crate::ratio_or_zero(acc.value, acc.weight),
            };
            let totals = CategoryTotals {
                category,
                weight_sum: acc.weight,
                value_sum: acc.value,
                rate_average,
                entry_count: acc.entries,
            };
            (category, totals)
        })
        .collect();

    tracing::debug!(
        categories = totals.len(),
        strategy = %strategy,
        "aggregated category totals"
    );
    totals
}

/// Totals over every row, including unclassified ones.
pub fn grand_totals(entries: &[TransactionEntry]) -> GrandTotals {
    entries.iter().fold(GrandTotals::default(), |mut g, entry| {
        g.weight_in += entry.weight_in;
        g.weight_out += entry.weight_out;
        match entry.side() {
            Side::In => g.value_in += entry.value,
            Side::Out => g.value_out += entry.value,
            Side::Flat => g.value_unapplied += entry.value,
        }
        g.entry_count += 1;
        if !entry.category.is_classified() {
            g.unclassified_count += 1;
        }
        if entry.is_ambiguous() {
            g.ambiguous_count += 1;
        }
        g
    })
}

/// Totals for `category`, or an all-zero record when it was not observed.
pub fn totals_for(totals: &CategoryTotalsMap, category: VoucherCategory) -> CategoryTotals {
    totals
        .get(&category)
        .cloned()
        .unwrap_or_else(|| CategoryTotals::empty(category))
}
