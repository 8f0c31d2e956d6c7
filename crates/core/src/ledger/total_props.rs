//! Property-based tests for row totals and the grand-total formula.

use caisse_shared::types::{format_amount, round_amount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::total::TotalCalculator;
use super::types::{CreditRow, DepenseRow, Ledger, Multiplier, RetraitRow};
use crate::expression::evaluate;

/// Strategy for an amount with up to two decimals, 0.00 to 100,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a sum expression of one to five amounts.
fn sum_expression() -> impl Strategy<Value = String> {
    prop::collection::vec(amount(), 1..5).prop_map(|items| {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" + ")
    })
}

fn multiplier() -> impl Strategy<Value = Multiplier> {
    prop::sample::select(Multiplier::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Repeated edits never let the cached total drift from the details.
    #[test]
    fn prop_cached_total_tracks_details(edits in prop::collection::vec(sum_expression(), 1..6)) {
        let mut row = CreditRow::default();
        for details in &edits {
            row.set_details(details.clone());
            prop_assert_eq!(row.total_client(), round_amount(evaluate(row.details())));
        }
    }

    /// Formatting a row total and reading it back gives the same display.
    #[test]
    fn prop_row_total_display_is_stable(details in sum_expression()) {
        let row = DepenseRow::new("", details);
        let redisplayed = format_amount(evaluate(&row.display_total()));
        prop_assert_eq!(redisplayed, row.display_total());
    }

    /// Each expense lowers the grand total by exactly its amount.
    #[test]
    fn prop_expense_lowers_total(
        opening in amount().prop_filter("non-zero", |d| !d.is_zero()),
        expense in amount(),
        m in multiplier(),
    ) {
        let mut ledger = Ledger::new(m);
        ledger.solde_de_debut = opening.to_string();
        let before = TotalCalculator::compute(&ledger).unwrap().total;

        ledger.depense_rows[0] = DepenseRow::new("", expense.to_string());
        let after = TotalCalculator::compute(&ledger).unwrap().total;

        prop_assert_eq!(before - after, round_amount(expense));
    }

    /// A fully paid withdrawal nets to `retrait * (multiplier - 1)`.
    #[test]
    fn prop_matched_withdrawal_nets_by_multiplier(
        opening in amount().prop_filter("non-zero", |d| !d.is_zero()),
        retrait in amount(),
        m in multiplier(),
    ) {
        let mut ledger = Ledger::new(m);
        ledger.solde_de_debut = opening.to_string();
        let before = TotalCalculator::compute(&ledger).unwrap().total;

        ledger.retrait_rows[0] = RetraitRow::new("", &retrait.to_string(), "OK");
        let after = TotalCalculator::compute(&ledger).unwrap().total;

        prop_assert_eq!(after - before, retrait * (m.value() - Decimal::ONE));
    }

    /// Credits subtract, and the total never depends on the credit client.
    #[test]
    fn prop_credit_subtracts(
        opening in amount().prop_filter("non-zero", |d| !d.is_zero()),
        details in sum_expression(),
        client in "[A-Za-z]{0,8}",
    ) {
        let mut ledger = Ledger::default();
        ledger.solde_de_debut = opening.to_string();
        let before = TotalCalculator::compute(&ledger).unwrap().total;

        ledger.credit_rows[0] = CreditRow::new(client, details);
        let expected = ledger.credit_rows[0].total_client();
        let after = TotalCalculator::compute(&ledger).unwrap().total;

        prop_assert_eq!(before - after, expected);
    }
}
