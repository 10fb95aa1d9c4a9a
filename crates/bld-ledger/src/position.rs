//! Net purchase / net sales / opening -> final position.
//!
//! Two framings of the same numbers are in use across reports:
//! - goods on hand: `net_purchase + opening - net_sales` (stock statements)
//! - exposure: `net_sales - (net_purchase + opening)` (fixing statements)
//!
//! They differ only in sign. [`compute_position`] keeps the flag-driven rule
//! (opening included -> goods on hand, opening excluded -> exposure);
//! [`compute_breakdown`] lets the caller choose explicitly.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::aggregate::{totals_for, CategoryTotalsMap};
use crate::error::LedgerError;
use crate::types::{NetTotals, Position, VoucherCategory};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionFraming {
    GoodsOnHand,
    Exposure,
}

impl PositionFraming {
    /// Framing implied by the opening flag alone.
    pub fn for_opening_flag(exclude_opening: bool) -> Self {
        if exclude_opening {
            PositionFraming::Exposure
        } else {
            PositionFraming::GoodsOnHand
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionFraming::GoodsOnHand => "goods_on_hand",
            PositionFraming::Exposure => "exposure",
        }
    }
}

impl FromStr for PositionFraming {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "goods_on_hand" => Ok(PositionFraming::GoodsOnHand),
            "exposure" => Ok(PositionFraming::Exposure),
            _ => Err(LedgerError::UnknownPositionFraming { raw: s.to_string() }),
        }
    }
}

impl std::fmt::Display for PositionFraming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intermediate nets and the resulting position.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionBreakdown {
    pub net_purchase: NetTotals,
    pub net_sales: NetTotals,
    /// Zero when opening was excluded or absent.
    pub opening: NetTotals,
    pub framing: PositionFraming,
    pub position: Position,
}

/// `totals[gross] - totals[returns]`; absent categories count as zero.
pub fn net_of(
    totals: &CategoryTotalsMap,
    gross: VoucherCategory,
    returns: VoucherCategory,
) -> NetTotals {
    totals_for(totals, gross).net() - totals_for(totals, returns).net()
}

/// Compute the position under an explicit framing.
pub fn compute_breakdown(
    totals: &CategoryTotalsMap,
    exclude_opening: bool,
    framing: PositionFraming,
) -> PositionBreakdown {
    let net_purchase = net_of(
        totals,
        VoucherCategory::Purchase,
        VoucherCategory::PurchaseReturn,
    );
    let net_sales = net_of(totals, VoucherCategory::Sale, VoucherCategory::SaleReturn);
    let opening = if exclude_opening {
        NetTotals::ZERO
    } else {
        totals_for(totals, VoucherCategory::Opening).net()
    };

    let on_hand = net_purchase + opening - net_sales;
    let net = match framing {
        PositionFraming::GoodsOnHand => on_hand,
        PositionFraming::Exposure => -on_hand,
    };

    PositionBreakdown {
        net_purchase,
        net_sales,
        opening,
        framing,
        position: Position::from_net(net),
    }
}

/// Compute the position, framing it by the opening flag.
pub fn compute_position(totals: &CategoryTotalsMap, exclude_opening: bool) -> Position {
    compute_breakdown(
        totals,
        exclude_opening,
        PositionFraming::for_opening_flag(exclude_opening),
    )
    .position
}
