//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use bld_ledger::{RateBasis, RateKind};
use clap::Args;
use serde_json::Value;

pub mod statement;
pub mod valuate;

/// Rate-basis flags shared by `statement` and `valuate`.
#[derive(Args, Debug, Clone)]
pub struct RateBasisArgs {
    /// spot | custom | weighted-average
    #[arg(long, default_value = "spot")]
    pub rate_kind: RateKind,

    /// Named entry under valuation.rate_types (needs --config)
    #[arg(long)]
    pub rate_type: Option<String>,

    /// Grams per rate unit; overrides config and defaults
    #[arg(long)]
    pub conversion_factor: Option<f64>,

    /// Local currency multiplier; overrides config and defaults (1 for custom rates)
    #[arg(long)]
    pub multiplier: Option<f64>,
}

impl RateBasisArgs {
    /// Resolve against the merged config (when given), then apply CLI overrides.
    pub fn resolve(&self, config_json: Option<&Value>, rate: f64) -> Result<RateBasis> {
        let from_config = match config_json {
            Some(cfg) => {
                bld_config::rate_basis(cfg, self.rate_kind, rate, self.rate_type.as_deref())?
            }
            None => {
                if let Some(name) = &self.rate_type {
                    bail!("--rate-type {name} needs --config to look it up");
                }
                bld_config::rate_basis(&Value::Null, self.rate_kind, rate, None)?
            }
        };

        if self.conversion_factor.is_none() && self.multiplier.is_none() {
            return Ok(from_config);
        }
        RateBasis::new(
            self.rate_kind,
            rate,
            self.conversion_factor
                .unwrap_or(from_config.conversion_factor()),
            self.multiplier
                .unwrap_or(from_config.local_currency_multiplier()),
        )
        .context("invalid rate basis flags")
    }
}
