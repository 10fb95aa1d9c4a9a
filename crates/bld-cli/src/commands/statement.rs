use anyhow::{bail, Context, Result};
use bld_config::UnusedKeyPolicy;
use bld_ledger::{build_statement, ReportKind};
use clap::Args;
use serde_json::Value;
use std::fs;

use super::RateBasisArgs;

#[derive(Args, Debug)]
pub struct StatementArgs {
    /// Layered config paths in merge order
    #[arg(long = "config", required = true)]
    pub config_paths: Vec<String>,

    /// fixing-registry | own-stock | sales-analysis | transaction-summary
    #[arg(long)]
    pub report: ReportKind,

    /// JSON file: an array of rows, or an object with a "data" array
    #[arg(long)]
    pub rows: String,

    /// Leave opening balances out, whatever the config says
    #[arg(long, default_value_t = false)]
    pub exclude_opening: bool,

    /// Reference rate for mark-to-market valuation
    #[arg(long)]
    pub market_rate: Option<f64>,

    #[command(flatten)]
    pub basis: RateBasisArgs,

    /// Fail instead of warning when the config has keys nothing reads
    #[arg(long, default_value_t = false)]
    pub strict_config: bool,
}

pub fn run(args: StatementArgs) -> Result<()> {
    let path_refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = bld_config::load_layered_yaml(&path_refs)?;

    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let unused = bld_config::report_unused_keys(&loaded.config_json, policy)?;
    if !unused.is_clean() {
        tracing::warn!(
            count = unused.unused_leaf_pointers.len(),
            keys = ?unused.unused_leaf_pointers,
            "config has keys no reader consumes"
        );
    }

    let mut profile = bld_config::report_profile(&loaded.config_json, args.report)?;
    if args.exclude_opening {
        profile = profile.excluding_opening(true);
    }

    let market = match args.market_rate {
        Some(rate) => Some(args.basis.resolve(Some(&loaded.config_json), rate)?),
        None => None,
    };

    let rows = read_rows(&args.rows)?;
    let statement = build_statement(&rows, &profile, market.as_ref())
        .with_context(|| format!("building {} statement", args.report))?;

    tracing::info!(
        report = %args.report,
        rows = rows.len(),
        config_hash = %loaded.config_hash,
        input_hash = %statement.input_hash,
        "statement built"
    );

    let out = serde_json::to_string_pretty(&statement).context("statement serialize failed")?;
    println!("{out}");
    Ok(())
}

fn read_rows(path: &str) -> Result<Vec<Value>> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read rows: {path}"))?;
    let doc: Value =
        serde_json::from_str(&raw).with_context(|| format!("rows file is not JSON: {path}"))?;
    match doc {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => bail!("rows file {path}: expected an array or an object with a \"data\" array"),
        },
        _ => bail!("rows file {path}: expected an array or an object with a \"data\" array"),
    }
}
