//! Voucher-code prefix table.
//!
//! Every report derives a row's category from the leading letters of its
//! voucher code (`PRM/0041` is a purchase, `PR/0007` a purchase return).
//! The table is validated once when it is built; classification itself never
//! fails and falls back to [`VoucherCategory::Other`].
//!
//! Matching is case-insensitive and the longest matching prefix wins, so a
//! table holding both `PR` and `PRM` classifies `PRM/1` by `PRM`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::LedgerError;
use crate::types::VoucherCategory;

/// Prefix table used when configuration does not supply one.
pub const DEFAULT_PREFIXES: &[(&str, VoucherCategory)] = &[
    ("PRM", VoucherCategory::Purchase),
    ("PF", VoucherCategory::Purchase),
    ("SAL", VoucherCategory::Sale),
    ("SF", VoucherCategory::Sale),
    ("PR", VoucherCategory::PurchaseReturn),
    ("SR", VoucherCategory::SaleReturn),
    ("MR", VoucherCategory::Receipt),
    ("RCT", VoucherCategory::Receipt),
    ("MP", VoucherCategory::Payment),
    ("PMT", VoucherCategory::Payment),
    ("OB", VoucherCategory::Opening),
    ("OPN", VoucherCategory::Opening),
];

/// Validated prefix -> category table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoucherClassifier {
    /// Upper-cased prefixes, longest first, ties broken alphabetically.
    prefixes: Vec<(String, VoucherCategory)>,
}

impl VoucherClassifier {
    /// Build a classifier from a prefix table.
    ///
    /// # Errors
    /// - [`LedgerError::EmptyPrefix`] for blank prefixes.
    /// - [`LedgerError::InvalidPrefix`] for anything but ASCII letters/digits.
    /// - [`LedgerError::PrefixToOther`] when a prefix targets `Other`.
    /// - [`LedgerError::ConflictingPrefix`] when one prefix (case-insensitive)
    ///   maps to two categories.
    pub fn new<I, S>(table: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (S, VoucherCategory)>,
        S: AsRef<str>,
    {
        let mut seen: BTreeMap<String, VoucherCategory> = BTreeMap::new();

        for (raw, category) in table {
            let prefix = raw.as_ref().trim().to_ascii_uppercase();
            if prefix.is_empty() {
                return Err(LedgerError::EmptyPrefix { category });
            }
            if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(LedgerError::InvalidPrefix { prefix });
            }
            if !category.is_classified() {
                return Err(LedgerError::PrefixToOther { prefix });
            }
            match seen.get(&prefix) {
                Some(first) if *first != category => {
                    return Err(LedgerError::ConflictingPrefix {
                        prefix,
                        first: *first,
                        second: category,
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(prefix, category);
                }
            }
        }

        Ok(Self::from_unique(seen))
    }

    /// The built-in table ([`DEFAULT_PREFIXES`]).
    pub fn standard() -> Self {
        Self::from_unique(
            DEFAULT_PREFIXES
                .iter()
                .map(|(p, c)| (p.to_string(), *c))
                .collect(),
        )
    }

    fn from_unique(table: BTreeMap<String, VoucherCategory>) -> Self {
        let mut prefixes: Vec<(String, VoucherCategory)> = table.into_iter().collect();
        prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { prefixes }
    }

    /// Category for a voucher code; `Other` when no prefix matches.
    pub fn classify(&self, voucher_code: &str) -> VoucherCategory {
        let code = voucher_code.trim().to_ascii_uppercase();
        self.prefixes
            .iter()
            .find(|(prefix, _)| code.starts_with(prefix.as_str()))
            .map(|(_, category)| *category)
            .unwrap_or(VoucherCategory::Other)
    }

    /// Prefixes in match order.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, VoucherCategory)> {
        self.prefixes.iter().map(|(p, c)| (p.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl Default for VoucherClassifier {
    fn default() -> Self {
        Self::standard()
    }
}
