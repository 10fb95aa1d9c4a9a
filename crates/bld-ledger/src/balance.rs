use serde::{Deserialize, Serialize};

use crate::types::{BalancedEntry, RunningState, TransactionEntry};

/// Output of [`accumulate`]: every row with its running balance, plus the
/// closing state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Accumulated {
    pub entries: Vec<BalancedEntry>,
    pub closing: RunningState,
}

/// Fold rows left to right into running weight/value balances.
///
/// Per row:
/// - `weight_balance += weight_in - weight_out`
/// - `value_balance += value` on the `In` side, `-= value` on the `Out` side,
///   unchanged for `Flat` rows
///
/// Balances are attached post-update. Intermediate balances depend on input
/// order; the closing state does not.
pub fn accumulate(entries: &[TransactionEntry]) -> Accumulated {
    let balanced: Vec<BalancedEntry> = entries
        .iter()
        .scan(RunningState::default(), |state, entry| {
            *state = state.apply(entry);
            Some(BalancedEntry {
                entry: entry.clone(),
                balance: *state,
            })
        })
        .collect();

    let closing = balanced.last().map(|b| b.balance).unwrap_or_default();

    Accumulated {
        entries: balanced,
        closing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoucherCategory::*;

    #[test]
    fn running_balance_is_attached_after_update() {
        let entries = vec![
            TransactionEntry::inward("PRM/1", Purchase, 100.0, 200.0, 20_000.0),
            TransactionEntry::outward("SAL/1", Sale, 40.0, 210.0, 8_400.0),
            TransactionEntry::outward("PR/1", PurchaseReturn, 10.0, 200.0, 2_000.0),
        ];
        let acc = accumulate(&entries);

        let weights: Vec<f64> = acc.entries.iter().map(|b| b.balance.weight_balance).collect();
        let values: Vec<f64> = acc.entries.iter().map(|b| b.balance.value_balance).collect();
        assert_eq!(weights, vec![100.0, 60.0, 50.0]);
        assert_eq!(values, vec![20_000.0, 11_600.0, 9_600.0]);
        assert_eq!(acc.closing.weight_balance, 50.0);
        assert_eq!(acc.closing.value_balance, 9_600.0);
    }

    #[test]
    fn flat_rows_pass_value_through() {
        let mut charge = TransactionEntry::new("JV/1", Other);
        charge.value = 500.0;
        let entries = vec![
            TransactionEntry::inward("PRM/1", Purchase, 10.0, 0.0, 1_000.0),
            charge,
        ];
        let acc = accumulate(&entries);
        assert_eq!(acc.entries[1].balance, acc.entries[0].balance);
    }

    #[test]
    fn both_sides_set_reads_as_inward_value() {
        let mut e = TransactionEntry::inward("PRM/1", Purchase, 10.0, 0.0, 1_000.0);
        e.weight_out = 4.0;
        let acc = accumulate(&[e]);
        assert_eq!(acc.closing.weight_balance, 6.0);
        assert_eq!(acc.closing.value_balance, 1_000.0);
    }

    #[test]
    fn empty_input_closes_at_zero() {
        let acc = accumulate(&[]);
        assert!(acc.entries.is_empty());
        assert_eq!(acc.closing, RunningState::default());
    }
}
