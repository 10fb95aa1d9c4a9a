//! Weight -> currency valuation and profit/loss.
//!
//! A [`RateBasis`] carries a rate quoted per pricing unit (usually a troy
//! ounce), the grams in that unit, and a multiplier into local currency:
//!
//! ```text
//! per_gram_rate = rate_value / conversion_factor * local_currency_multiplier
//! value         = per_gram_rate * weight_grams
//! ```
//!
//! Rates already quoted in local currency use a multiplier of 1
//! ([`RateBasis::currency_denominated`]).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::types::Position;

/// Grams per troy ounce.
pub const DEFAULT_CONVERSION_FACTOR: f64 = 31.1035;

/// Pegged USD -> local currency rate used for ounce quotes.
pub const DEFAULT_LOCAL_CURRENCY_MULTIPLIER: f64 = 3.674;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKind {
    /// Market bid per pricing unit.
    Spot,
    /// Rate entered by the user.
    Custom,
    /// Weighted-average rate taken from the ledger itself.
    WeightedAverage,
}

impl RateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateKind::Spot => "spot",
            RateKind::Custom => "custom",
            RateKind::WeightedAverage => "weighted_average",
        }
    }
}

impl FromStr for RateKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "spot" => Ok(RateKind::Spot),
            "custom" => Ok(RateKind::Custom),
            "weighted_average" => Ok(RateKind::WeightedAverage),
            _ => Err(LedgerError::UnknownRateKind { raw: s.to_string() }),
        }
    }
}

impl std::fmt::Display for RateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated rate basis. Construct through [`RateBasis::new`] or one of the
/// kind-specific constructors.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RateBasis {
    kind: RateKind,
    rate_value: f64,
    conversion_factor_grams_per_unit: f64,
    local_currency_multiplier: f64,
}

impl RateBasis {
    /// # Errors
    /// - [`LedgerError::InvalidRate`] unless `rate_value` is finite and >= 0.
    /// - [`LedgerError::InvalidConversionFactor`] unless the factor is finite and > 0.
    /// - [`LedgerError::InvalidMultiplier`] unless the multiplier is finite and > 0.
    pub fn new(
        kind: RateKind,
        rate_value: f64,
        conversion_factor_grams_per_unit: f64,
        local_currency_multiplier: f64,
    ) -> Result<Self, LedgerError> {
        if !rate_value.is_finite() || rate_value < 0.0 {
            return Err(LedgerError::InvalidRate { value: rate_value });
        }
        if !conversion_factor_grams_per_unit.is_finite() || conversion_factor_grams_per_unit <= 0.0
        {
            return Err(LedgerError::InvalidConversionFactor {
                value: conversion_factor_grams_per_unit,
            });
        }
        if !local_currency_multiplier.is_finite() || local_currency_multiplier <= 0.0 {
            return Err(LedgerError::InvalidMultiplier {
                value: local_currency_multiplier,
            });
        }
        Ok(Self {
            kind,
            rate_value,
            conversion_factor_grams_per_unit,
            local_currency_multiplier,
        })
    }

    /// Market bid per troy ounce, converted with the default multiplier.
    pub fn spot(bid_per_ounce: f64) -> Result<Self, LedgerError> {
        Self::new(
            RateKind::Spot,
            bid_per_ounce,
            DEFAULT_CONVERSION_FACTOR,
            DEFAULT_LOCAL_CURRENCY_MULTIPLIER,
        )
    }

    /// Ledger weighted-average rate per troy ounce, default multiplier.
    pub fn weighted_average(rate_per_ounce: f64) -> Result<Self, LedgerError> {
        Self::new(
            RateKind::WeightedAverage,
            rate_per_ounce,
            DEFAULT_CONVERSION_FACTOR,
            DEFAULT_LOCAL_CURRENCY_MULTIPLIER,
        )
    }

    /// User-entered rate with explicit factor and multiplier.
    pub fn custom(
        rate_value: f64,
        conversion_factor_grams_per_unit: f64,
        local_currency_multiplier: f64,
    ) -> Result<Self, LedgerError> {
        Self::new(
            RateKind::Custom,
            rate_value,
            conversion_factor_grams_per_unit,
            local_currency_multiplier,
        )
    }

    /// Same basis with the multiplier dropped (rate is already local currency).
    pub fn currency_denominated(self) -> Self {
        Self {
            local_currency_multiplier: 1.0,
            ..self
        }
    }

    pub fn kind(&self) -> RateKind {
        self.kind
    }

    /// The rate as quoted, per pricing unit.
    pub fn rate_value(&self) -> f64 {
        self.rate_value
    }

    pub fn conversion_factor(&self) -> f64 {
        self.conversion_factor_grams_per_unit
    }

    pub fn local_currency_multiplier(&self) -> f64 {
        self.local_currency_multiplier
    }

    /// Local currency per gram.
    pub fn per_gram_rate(&self) -> f64 {
        self.rate_value / self.conversion_factor_grams_per_unit * self.local_currency_multiplier
    }
}

/// Currency value of `weight_grams` at `basis`.
pub fn valuate(weight_grams: f64, basis: &RateBasis) -> f64 {
    basis.per_gram_rate() * weight_grams
}

/// Market value of the position minus its book value.
pub fn mark_to_market_pnl(position: &Position, basis: &RateBasis) -> f64 {
    valuate(position.weight_grams, basis) - position.value
}

/// Realized trading profit: net sales value minus net purchase value.
pub fn trading_profit(net_sales_value: f64, net_purchase_value: f64) -> f64 {
    net_sales_value - net_purchase_value
}

/// Position valued at a reference rate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Valuation {
    pub rate_basis: RateBasis,
    pub per_gram_rate: f64,
    pub market_value: f64,
    pub mark_to_market_pnl: f64,
}

pub fn valuate_position(position: &Position, basis: &RateBasis) -> Valuation {
    Valuation {
        rate_basis: *basis,
        per_gram_rate: basis.per_gram_rate(),
        market_value: valuate(position.weight_grams, basis),
        mark_to_market_pnl: mark_to_market_pnl(position, basis),
    }
}
