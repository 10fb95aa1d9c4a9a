//! Scenario: building a rate basis from the valuation section.
//!
//! Resolution order: rate type, then `valuation.*`, then ledger defaults.
//! A custom rate carries no multiplier unless its rate type names one.

use bld_config::{load_layered_yaml_from_strings, rate_basis};
use bld_ledger::{valuate, RateKind, DEFAULT_CONVERSION_FACTOR};

const CONFIG: &str = r#"
valuation:
  local_currency_multiplier: 3.6725
  rate_types:
    - name: GOLD_OZ
      conversion_factor: 31.1035
    - name: KILOBAR
      conversion_factor: 1000
      currency_denominated: true
    - name: TOLA
      conversion_factor: 11.6638
      local_currency_multiplier: 1.0
"#;

fn config() -> serde_json::Value {
    load_layered_yaml_from_strings(&[CONFIG]).unwrap().config_json
}

#[test]
fn section_multiplier_overrides_default() {
    let b = rate_basis(&config(), RateKind::Spot, 2_400.0, None).unwrap();
    assert_eq!(b.conversion_factor(), DEFAULT_CONVERSION_FACTOR);
    assert_eq!(b.local_currency_multiplier(), 3.6725);
}

#[test]
fn rate_type_overrides_section() {
    let cfg = config();

    let kilo = rate_basis(&cfg, RateKind::Custom, 285_000.0, Some("KILOBAR")).unwrap();
    assert_eq!(kilo.conversion_factor(), 1_000.0);
    assert_eq!(kilo.local_currency_multiplier(), 1.0);
    assert!((valuate(500.0, &kilo) - 142_500.0).abs() < 1e-9);

    let tola = rate_basis(&cfg, RateKind::WeightedAverage, 2_950.0, Some("tola")).unwrap();
    assert_eq!(tola.conversion_factor(), 11.6638);
    assert_eq!(tola.local_currency_multiplier(), 1.0);
    assert_eq!(tola.kind(), RateKind::WeightedAverage);
}

#[test]
fn unknown_rate_type_is_an_error() {
    let err = rate_basis(&config(), RateKind::Spot, 2_400.0, Some("SILVER_OZ")).unwrap_err();
    assert!(format!("{err:#}").contains("CONFIG_UNKNOWN_RATE_TYPE"));
}

#[test]
fn invalid_numbers_are_errors() {
    let zero_factor = load_layered_yaml_from_strings(&["valuation:\n  conversion_factor: 0\n"])
        .unwrap()
        .config_json;
    assert!(rate_basis(&zero_factor, RateKind::Spot, 2_400.0, None).is_err());

    assert!(rate_basis(&config(), RateKind::Spot, -1.0, None).is_err());

    let stray_key = load_layered_yaml_from_strings(&[
        "valuation:\n  rate_types:\n    - name: X\n      factor: 10\n",
    ])
    .unwrap()
    .config_json;
    assert!(rate_basis(&stray_key, RateKind::Spot, 1.0, Some("X")).is_err());
}

#[test]
fn custom_rate_ignores_section_multiplier() {
    let cfg = config();

    let custom = rate_basis(&cfg, RateKind::Custom, 250.0, None).unwrap();
    assert_eq!(custom.local_currency_multiplier(), 1.0);
    assert!((valuate(100.0, &custom) - 250.0 / 31.1035 * 100.0).abs() < 1e-9);

    // The same rate as a spot quote still converts.
    let spot = rate_basis(&cfg, RateKind::Spot, 250.0, None).unwrap();
    assert_eq!(spot.local_currency_multiplier(), 3.6725);

    let tola = rate_basis(&cfg, RateKind::Custom, 2_950.0, Some("TOLA")).unwrap();
    assert_eq!(tola.local_currency_multiplier(), 1.0);
}
