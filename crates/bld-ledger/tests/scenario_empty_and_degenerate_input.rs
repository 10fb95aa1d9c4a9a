//! Scenario: empty and degenerate inputs never error and never produce NaN.
//!
//! GREEN when:
//! - empty rows give all-zero totals, a zero closing balance and a Long
//!   position
//! - a category whose weight nets to zero reports a zero average rate
//! - malformed rows are kept, coerced, and counted in grand totals

use bld_ledger::{
    accumulate, aggregate, build_statement, compute_position, AveragingStrategy,
    CategoryTotalsMap, PositionStatus, RateBasis, ReportKind, ReportProfile, RunningState,
    VoucherCategory,
};
use serde_json::json;

#[test]
fn empty_input_yields_zero_structures() {
    assert!(aggregate(&[], AveragingStrategy::Simple).is_empty());
    assert!(aggregate(&[], AveragingStrategy::Weighted).is_empty());
    assert_eq!(accumulate(&[]).closing, RunningState::default());

    let p = compute_position(&CategoryTotalsMap::new(), true);
    assert_eq!(p.status, PositionStatus::Long);
    assert_eq!(p.weight_grams, 0.0);
    assert_eq!(p.value, 0.0);
    assert_eq!(p.average_rate, 0.0);
}

#[test]
fn empty_statement_is_all_zero_with_valuation() {
    let profile = ReportProfile::new(ReportKind::OwnStock, AveragingStrategy::Weighted);
    let market = RateBasis::spot(2_350.0).unwrap();
    let st = build_statement(&[], &profile, Some(&market)).unwrap();

    assert!(st.entries.is_empty());
    assert!(st.categories.is_empty());
    assert_eq!(st.grand_totals.entry_count, 0);
    assert_eq!(st.breakdown.position.status, PositionStatus::Long);
    assert_eq!(st.trading_profit, 0.0);

    let v = st.valuation.unwrap();
    assert_eq!(v.market_value, 0.0);
    assert_eq!(v.mark_to_market_pnl, 0.0);
}

#[test]
fn empty_statement_serializes_without_negative_zero() {
    let profile = ReportProfile::new(ReportKind::FixingRegistry, AveragingStrategy::Simple)
        .excluding_opening(true);
    let st = build_statement(&[], &profile, None).unwrap();
    let text = serde_json::to_string(&st).unwrap();
    assert!(!text.contains("-0.0"), "unexpected negative zero in {text}");
}

#[test]
fn malformed_rows_are_kept_and_coerced() {
    let rows = vec![
        json!({ "vocNo": "PRM/1", "pureWtIn": "ten", "amountValue": {} }),
        json!({ "vocNo": null, "pureWtOut": [], "rate": "NaN" }),
        json!("not a row"),
        json!({ "vocNo": "SAL/1", "pureWtOut": "", "amountValue": "1,200" }),
    ];
    let profile = ReportProfile::new(ReportKind::TransactionSummary, AveragingStrategy::Simple);
    let st = build_statement(&rows, &profile, None).unwrap();

    assert_eq!(st.entries.len(), 4);
    assert_eq!(st.grand_totals.entry_count, 4);
    assert_eq!(st.grand_totals.unclassified_count, 2);
    for b in &st.entries {
        assert_eq!(b.entry.weight_in, 0.0);
        assert_eq!(b.entry.weight_out, 0.0);
        assert_eq!(b.entry.value, 0.0);
        assert_eq!(b.entry.rate, 0.0);
    }
    assert_eq!(st.categories[&VoucherCategory::Purchase].rate_average, 0.0);
    assert_eq!(st.closing, RunningState::default());
}

#[test]
fn zero_net_category_has_zero_average_not_nan() {
    let rows = vec![
        json!({ "vocNo": "SAL/1", "pureWtOut": 25, "rate": 210, "amountValue": 5250 }),
        json!({ "vocNo": "SAL/2", "pureWtIn": 25, "rate": 210, "amountValue": 5250 }),
    ];
    let profile = ReportProfile::new(ReportKind::SalesAnalysis, AveragingStrategy::Weighted);
    let st = build_statement(&rows, &profile, None).unwrap();

    let sale = &st.categories[&VoucherCategory::Sale];
    assert_eq!(sale.weight_sum, 0.0);
    assert_eq!(sale.value_sum, 0.0);
    assert_eq!(sale.rate_average, 0.0);
}

#[test]
fn value_only_rows_reach_the_aggregates() {
    let rows = vec![
        json!({ "vocNo": "JV/0001", "amountValue": 150, "narration": "making charges" }),
        json!({ "vocNo": "RCT/0001", "amountValue": 5000 }),
    ];
    let profile = ReportProfile::new(ReportKind::TransactionSummary, AveragingStrategy::Weighted);
    let st = build_statement(&rows, &profile, None).unwrap();

    // No weight moved, so the running balance stays put.
    assert_eq!(st.closing, RunningState::default());

    let receipt = &st.categories[&VoucherCategory::Receipt];
    assert_eq!(receipt.value_sum, 5_000.0);

    let g = &st.grand_totals;
    assert_eq!(g.value_in, 0.0);
    assert_eq!(g.value_out, 0.0);
    assert_eq!(g.value_unapplied, 5_150.0);
    assert_eq!(g.unclassified_count, 1);
}

#[test]
fn both_sided_rows_are_counted_as_ambiguous() {
    let rows = vec![
        json!({ "vocNo": "PRM/0001", "pureWtIn": 10, "pureWtOut": 4, "rate": 100, "amountValue": 1000 }),
        json!({ "vocNo": "SAL/0001", "pureWtOut": 2, "rate": 110, "amountValue": 220 }),
    ];
    let profile = ReportProfile::new(ReportKind::OwnStock, AveragingStrategy::Weighted);
    let st = build_statement(&rows, &profile, None).unwrap();

    assert_eq!(st.grand_totals.ambiguous_count, 1);
    let purchase = &st.categories[&VoucherCategory::Purchase];
    assert_eq!(purchase.weight_sum, 6.0);
    assert_eq!(purchase.value_sum, 1_000.0);
    // Weight nets per row; the value is read as inward.
    assert_eq!(st.entries[0].balance.weight_balance, 6.0);
    assert_eq!(st.entries[0].balance.value_balance, 1_000.0);
    assert_eq!(st.breakdown.position.weight_grams, 4.0);
}
