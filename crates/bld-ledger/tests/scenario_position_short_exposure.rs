//! Scenario: purchase, sale and purchase return net to a short exposure.
//!
//! Rows:
//! - Purchase 100 g @ 200 (value 20 000)
//! - Sale 40 g @ 210 (value 8 400)
//! - Purchase return 10 g (value 2 000)
//!
//! Expected:
//! - net purchase = 90 g / 18 000
//! - net sales = 40 g / 8 400
//! - exposure framing: 40 - 90 = -50 g -> Short
//! - average rate = (8 400 - 18 000) / -50 = 192

use bld_ledger::{
    aggregate, build_statement, compute_breakdown, compute_position, AveragingStrategy,
    NetTotals, PositionFraming, PositionStatus, ReportKind, ReportProfile, TransactionEntry,
    VoucherCategory,
};
use serde_json::json;

fn entries() -> Vec<TransactionEntry> {
    vec![
        TransactionEntry::inward("PRM/0001", VoucherCategory::Purchase, 100.0, 200.0, 20_000.0),
        TransactionEntry::outward("SAL/0001", VoucherCategory::Sale, 40.0, 210.0, 8_400.0),
        TransactionEntry::outward("PR/0001", VoucherCategory::PurchaseReturn, 10.0, 0.0, 2_000.0),
    ]
}

#[test]
fn nets_and_short_position_match_hand_computation() {
    for strategy in [AveragingStrategy::Simple, AveragingStrategy::Weighted] {
        let totals = aggregate(&entries(), strategy);
        let b = compute_breakdown(&totals, true, PositionFraming::Exposure);

        assert_eq!(b.net_purchase, NetTotals::new(90.0, 18_000.0));
        assert_eq!(b.net_sales, NetTotals::new(40.0, 8_400.0));
        assert_eq!(b.position.weight_grams, -50.0);
        assert_eq!(b.position.value, -9_600.0);
        assert_eq!(b.position.status, PositionStatus::Short);
        assert_eq!(b.position.average_rate, 192.0);
    }
}

#[test]
fn compute_position_with_opening_excluded_uses_exposure_framing() {
    let totals = aggregate(&entries(), AveragingStrategy::Weighted);
    let p = compute_position(&totals, true);
    assert_eq!(p.weight_grams, -50.0);
    assert_eq!(p.status, PositionStatus::Short);
    assert_eq!(p.average_rate, 192.0);
}

#[test]
fn goods_on_hand_framing_reports_the_same_stock_as_long() {
    let totals = aggregate(&entries(), AveragingStrategy::Weighted);
    let p = compute_position(&totals, false);
    assert_eq!(p.weight_grams, 50.0);
    assert_eq!(p.value, 9_600.0);
    assert_eq!(p.status, PositionStatus::Long);
    assert_eq!(p.average_rate, 192.0);
}

#[test]
fn raw_report_rows_reach_the_same_numbers() {
    let rows = vec![
        json!({ "vocNo": "PRM/0001", "vocDate": "2024-01-02", "pureWtIn": "100", "rate": 200, "amountValue": 20000 }),
        json!({ "vocNo": "SAL/0001", "vocDate": "2024-01-03", "pureWtOut": 40, "rate": "210", "amountValue": "8400" }),
        json!({ "vocNo": "PR/0001", "vocDate": "2024-01-04", "pureWtOut": 10, "amountValue": 2000 }),
    ];
    let profile = ReportProfile::new(ReportKind::FixingRegistry, AveragingStrategy::Weighted)
        .excluding_opening(true);

    let st = build_statement(&rows, &profile, None).unwrap();

    assert_eq!(st.breakdown.framing, PositionFraming::Exposure);
    assert_eq!(st.breakdown.position.weight_grams, -50.0);
    assert_eq!(st.breakdown.position.average_rate, 192.0);
    assert_eq!(st.trading_profit, 8_400.0 - 18_000.0);
    assert_eq!(st.closing.weight_balance, 50.0);
    assert_eq!(st.closing.value_balance, 9_600.0);
    assert!(st.valuation.is_none());
}
