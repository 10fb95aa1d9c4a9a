use anyhow::{Context, Result};
use bld_ledger::{valuate, RateBasis};
use clap::Args;
use serde::Serialize;

use super::RateBasisArgs;

#[derive(Args, Debug)]
pub struct ValuateArgs {
    /// Weight in grams (negative for a short position)
    #[arg(long, allow_hyphen_values = true)]
    pub weight: f64,

    /// Rate per unit of the rate basis
    #[arg(long)]
    pub rate: f64,

    #[command(flatten)]
    pub basis: RateBasisArgs,

    /// Optional layered config paths for valuation settings
    #[arg(long = "config")]
    pub config_paths: Vec<String>,
}

#[derive(Serialize)]
struct ValuateOutput {
    weight_grams: f64,
    rate_basis: RateBasis,
    per_gram_rate: f64,
    value: f64,
}

pub fn run(args: ValuateArgs) -> Result<()> {
    let config_json = if args.config_paths.is_empty() {
        None
    } else {
        let path_refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
        Some(bld_config::load_layered_yaml(&path_refs)?.config_json)
    };

    let basis = args.basis.resolve(config_json.as_ref(), args.rate)?;
    let out = ValuateOutput {
        weight_grams: args.weight,
        rate_basis: basis,
        per_gram_rate: basis.per_gram_rate(),
        value: valuate(args.weight, &basis),
    };
    tracing::debug!(kind = %basis.kind(), value = out.value, "valuated");

    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("valuation serialize failed")?
    );
    Ok(())
}
