//! Scenario: rows shaped by different report APIs normalize to the same entries.
//!
//! The fixing registry sends `pureWtIn`/`amountValue`, the own-stock report
//! sends `stockIn`/`value`, and the transaction summary sends the generic
//! names. All three describe the same purchase.

use bld_ledger::{
    build_statement, normalize, AveragingStrategy, FieldAliases, ReportKind, ReportProfile,
    TransactionEntry, VoucherCategory, VoucherClassifier,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

fn normalize_one(row: Value) -> TransactionEntry {
    let mut out = normalize(&[row], &FieldAliases::default(), &VoucherClassifier::standard());
    out.remove(0)
}

#[test]
fn three_report_shapes_normalize_identically() {
    let fixing = normalize_one(json!({
        "vocNo": "PRM/0009",
        "vocDate": "2024-05-01",
        "pureWtIn": 12.5,
        "grossWtIn": 13.0,
        "rate": 7850,
        "amountValue": 98125,
        "narration": "bar purchase",
    }));
    let own_stock = normalize_one(json!({
        "voucherNo": "PRM/0009",
        "voucherDate": "01/05/2024",
        "stockIn": "12.5",
        "grossWeightIn": "13",
        "fixingRate": "7850",
        "value": "98125",
        "remarks": "bar purchase",
    }));
    let summary = normalize_one(json!({
        "voucherCode": "prm/0009",
        "date": "2024-05-01T09:30:00+04:00",
        "weightIn": 12.5,
        "grossWtIn": 13,
        "metalRate": 7850.0,
        "amount": 98125,
        "description": "bar purchase",
    }));

    let expected_date = NaiveDate::from_ymd_opt(2024, 5, 1);
    for e in [&fixing, &own_stock, &summary] {
        assert_eq!(e.category, VoucherCategory::Purchase);
        assert_eq!(e.date, expected_date);
        assert_eq!(e.weight_in, 12.5);
        assert_eq!(e.gross_weight_in, 13.0);
        assert_eq!(e.weight_out, 0.0);
        assert_eq!(e.rate, 7850.0);
        assert_eq!(e.value, 98125.0);
        assert_eq!(e.narration, "bar purchase");
    }
    assert_eq!(fixing.voucher_code, "PRM/0009");
    assert_eq!(summary.voucher_code, "prm/0009");
}

#[test]
fn report_specific_aliases_come_from_the_profile() {
    let aliases = FieldAliases::default()
        .with_override("weight_in", ["goldIn", "pureWtIn"])
        .unwrap()
        .with_override("value", ["lineTotal"])
        .unwrap();
    let profile = ReportProfile::new(ReportKind::OwnStock, AveragingStrategy::Weighted)
        .with_aliases(aliases);

    let rows = vec![json!({
        "vocNo": "PF/1",
        "goldIn": 3,
        "pureWtIn": 99,
        "lineTotal": 600,
        "amountValue": 1,
    })];
    let st = build_statement(&rows, &profile, None).unwrap();
    let e = &st.entries[0].entry;
    assert_eq!(e.weight_in, 3.0);
    assert_eq!(e.value, 600.0);
}

#[test]
fn custom_prefix_table_reclassifies_rows() {
    let classifier = VoucherClassifier::new([
        ("BUY", VoucherCategory::Purchase),
        ("SELL", VoucherCategory::Sale),
    ])
    .unwrap();
    let profile = ReportProfile::new(ReportKind::SalesAnalysis, AveragingStrategy::Weighted)
        .with_classifier(classifier);

    let rows = vec![
        json!({ "vocNo": "BUY-1", "pureWtIn": 10, "amountValue": 2000 }),
        json!({ "vocNo": "SELL-1", "pureWtOut": 4, "amountValue": 840 }),
        json!({ "vocNo": "PRM/1", "pureWtIn": 1, "amountValue": 200 }),
    ];
    let st = build_statement(&rows, &profile, None).unwrap();

    assert_eq!(st.entries_in(VoucherCategory::Purchase).count(), 1);
    assert_eq!(st.entries_in(VoucherCategory::Sale).count(), 1);
    assert_eq!(st.entries_in(VoucherCategory::Other).count(), 1);
    assert_eq!(st.grand_totals.unclassified_count, 1);
    // Unclassified rows still move the running balance.
    assert_eq!(st.closing.weight_balance, 7.0);
}
