//! Typed readers over the merged config JSON.

use anyhow::{bail, Context, Result};
use bld_ledger::{
    AveragingStrategy, FieldAliases, PositionFraming, RateBasis, RateKind, ReportKind,
    ReportProfile, VoucherCategory, VoucherClassifier, DEFAULT_CONVERSION_FACTOR,
    DEFAULT_LOCAL_CURRENCY_MULTIPLIER,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::deep_merge;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileSections {
    engine: EngineSection,
    vouchers: VouchersSection,
    fields: FieldAliases,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EngineSection {
    averaging_strategy: Option<String>,
    position_framing: Option<String>,
    exclude_opening: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VouchersSection {
    prefixes: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ValuationSection {
    conversion_factor: Option<f64>,
    local_currency_multiplier: Option<f64>,
    currency_denominated: bool,
    rate_types: Vec<RateTypeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RateTypeEntry {
    name: String,
    #[serde(default)]
    conversion_factor: Option<f64>,
    #[serde(default)]
    local_currency_multiplier: Option<f64>,
    #[serde(default)]
    currency_denominated: Option<bool>,
}

/// Root `engine`/`vouchers`/`fields` with `/reports/<kind>` merged over them.
fn profile_view(config_json: &Value, kind: ReportKind) -> Value {
    let mut base = Map::new();
    for key in ["engine", "vouchers", "fields"] {
        if let Some(v) = config_json.get(key) {
            base.insert(key.to_string(), v.clone());
        }
    }
    let overlay = config_json
        .pointer(&format!("/reports/{}", kind.as_str()))
        .cloned()
        .unwrap_or(Value::Null);

    match overlay {
        Value::Null => Value::Object(base),
        other => deep_merge(Value::Object(base), other),
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Build the validated profile for `kind`.
///
/// `engine.averaging_strategy` is required (root or report overlay). An
/// explicit `engine.position_framing` wins over the opening flag. A
/// `vouchers.prefixes` table replaces the built-in one; overlay entries merge
/// key by key over the root table.
pub fn report_profile(config_json: &Value, kind: ReportKind) -> Result<ReportProfile> {
    let view = profile_view(config_json, kind);
    let sections: ProfileSections = serde_json::from_value(view)
        .with_context(|| format!("invalid profile config for report {kind}"))?;

    let Some(raw_strategy) = sections.engine.averaging_strategy.as_deref() else {
        bail!(
            "CONFIG_MISSING_KEY: engine.averaging_strategy is required for report {kind} \
            (set it at the root or under reports.{kind}.engine)"
        );
    };
    let strategy: AveragingStrategy = raw_strategy
        .parse()
        .with_context(|| format!("engine.averaging_strategy for report {kind}"))?;

    let mut profile = ReportProfile::new(kind, strategy)
        .excluding_opening(sections.engine.exclude_opening.unwrap_or(false))
        .with_aliases(sections.fields);

    if let Some(raw) = sections.engine.position_framing.as_deref() {
        let framing: PositionFraming = raw
            .parse()
            .with_context(|| format!("engine.position_framing for report {kind}"))?;
        profile = profile.with_framing(framing);
    }

    if let Some(table) = sections.vouchers.prefixes {
        profile = profile.with_classifier(classifier_from_table(&table, kind)?);
    }

    tracing::debug!(
        report = %kind,
        strategy = %profile.averaging_strategy,
        framing = %profile.effective_framing(),
        prefixes = profile.classifier.len(),
        "resolved report profile"
    );
    Ok(profile)
}

fn classifier_from_table(
    table: &BTreeMap<String, String>,
    kind: ReportKind,
) -> Result<VoucherClassifier> {
    if table.is_empty() {
        bail!("vouchers.prefixes for report {kind} is empty; omit it to use the built-in table");
    }
    let mut rows: Vec<(&str, VoucherCategory)> = Vec::with_capacity(table.len());
    for (prefix, raw_category) in table {
        let category: VoucherCategory = raw_category
            .parse()
            .with_context(|| format!("vouchers.prefixes.{prefix} for report {kind}"))?;
        rows.push((prefix.as_str(), category));
    }
    VoucherClassifier::new(rows).with_context(|| format!("vouchers.prefixes for report {kind}"))
}

/// Build a rate basis from the root `valuation` section.
///
/// Resolution order for the conversion factor and multiplier: the named rate
/// type, then `valuation.*`, then the ledger defaults. A custom rate is taken
/// as entered: its multiplier is 1 unless the named rate type sets one. A
/// currency-denominated rate type (or section) forces the multiplier to 1.
pub fn rate_basis(
    config_json: &Value,
    kind: RateKind,
    rate: f64,
    rate_type: Option<&str>,
) -> Result<RateBasis> {
    let section: ValuationSection = match config_json.get("valuation") {
        Some(v) => serde_json::from_value(v.clone()).context("invalid valuation config")?,
        None => ValuationSection::default(),
    };

    let mut conversion_factor = section.conversion_factor.unwrap_or(DEFAULT_CONVERSION_FACTOR);
    let mut multiplier = match kind {
        RateKind::Custom => 1.0,
        RateKind::Spot | RateKind::WeightedAverage => section
            .local_currency_multiplier
            .unwrap_or(DEFAULT_LOCAL_CURRENCY_MULTIPLIER),
    };
    let mut currency_denominated = section.currency_denominated;

    if let Some(name) = rate_type {
        let mut matches = section
            .rate_types
            .iter()
            .filter(|t| t.name.trim().eq_ignore_ascii_case(name.trim()));
        let Some(entry) = matches.next() else {
            bail!("CONFIG_UNKNOWN_RATE_TYPE: {name} is not listed under valuation.rate_types");
        };
        if matches.next().is_some() {
            bail!("CONFIG_DUPLICATE_RATE_TYPE: {name} is listed more than once");
        }
        if let Some(f) = entry.conversion_factor {
            conversion_factor = f;
        }
        if let Some(m) = entry.local_currency_multiplier {
            multiplier = m;
        }
        if let Some(c) = entry.currency_denominated {
            currency_denominated = c;
        }
    }

    let basis = RateBasis::new(kind, rate, conversion_factor, multiplier).with_context(|| {
        format!("rate basis (kind={kind}, rate_type={})", rate_type.unwrap_or("-"))
    })?;
    Ok(if currency_denominated {
        basis.currency_denominated()
    } else {
        basis
    })
}
