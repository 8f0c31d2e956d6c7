//! Grand-total calculation.
//!
//! ```text
//! total = ((soldeDeDebut + totalRetrait) - soldeALinstant) * multiplier
//!         - totalRetraitPayee - totalDepense - totalCredit
//!         + totalCreditPayee + fond
//! ```

use caisse_shared::types::{result_label, saturating_sum};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{CreditPayeeRow, CreditRow, DepenseRow, Ledger, Multiplier, RetraitRow};
use super::validation::{BalanceField, FieldError, validate_field};

/// Validated scalar balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    /// Opening balance (mandatory).
    pub solde_de_debut: Decimal,
    /// Observed balance.
    pub solde_a_linstant: Decimal,
    /// Cash-float adjustment.
    pub fond: Decimal,
}

/// Per-ledger aggregates feeding the formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    /// Sum of withdrawal amounts.
    pub total_retrait: Decimal,
    /// Sum of resolved payee amounts.
    pub total_retrait_payee: Decimal,
    /// Sum of credit row totals.
    pub total_credit: Decimal,
    /// Sum of collected-credit row totals.
    pub total_credit_payee: Decimal,
    /// Sum of expense row totals.
    pub total_depense: Decimal,
}

impl LedgerTotals {
    /// Aggregates the four ledgers from their cached row totals.
    #[must_use]
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            total_retrait: saturating_sum(ledger.retrait_rows.iter().map(|r| r.retrait)),
            total_retrait_payee: saturating_sum(
                ledger.retrait_rows.iter().map(RetraitRow::payee_amount),
            ),
            total_credit: saturating_sum(ledger.credit_rows.iter().map(CreditRow::total_client)),
            total_credit_payee: saturating_sum(
                ledger.credit_payee_rows.iter().map(CreditPayeeRow::total_payee),
            ),
            total_depense: saturating_sum(ledger.depense_rows.iter().map(DepenseRow::total_depense)),
        }
    }
}

/// Result of a successful calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    /// Validated balances used.
    pub balances: Balances,
    /// Multiplier applied.
    pub multiplier: Multiplier,
    /// Ledger aggregates used.
    pub totals: LedgerTotals,
    /// Unrounded grand total.
    pub total: Decimal,
    /// Optional fields that failed validation and counted as zero.
    pub warnings: Vec<FieldError>,
}

impl Calculation {
    /// `"Total: X.X"` label for the grand total.
    #[must_use]
    pub fn result_label(&self) -> String {
        result_label(self.total)
    }
}

/// Calculator for the grand total of a form.
pub struct TotalCalculator;

impl TotalCalculator {
    /// Applies the grand-total formula.
    ///
    /// Every step clamps at the `Decimal` range.
    #[must_use]
    pub fn compute_total(balances: &Balances, multiplier: Multiplier, totals: &LedgerTotals) -> Decimal {
        balances
            .solde_de_debut
            .saturating_add(totals.total_retrait)
            .saturating_sub(balances.solde_a_linstant)
            .saturating_mul(multiplier.value())
            .saturating_sub(totals.total_retrait_payee)
            .saturating_sub(totals.total_depense)
            .saturating_sub(totals.total_credit)
            .saturating_add(totals.total_credit_payee)
            .saturating_add(balances.fond)
    }

    /// Validates the balances and computes the grand total of a ledger.
    ///
    /// Optional fields that fail validation count as zero and are reported
    /// in `warnings`.
    ///
    /// # Errors
    ///
    /// Returns a `FieldError` for `soldeDeDebut` when it is empty, zero or
    /// unreadable.
    pub fn compute(ledger: &Ledger) -> Result<Calculation, FieldError> {
        let mut warnings = Vec::new();
        let mut optional = |field: BalanceField, raw: &str| {
            validate_field(field, raw).unwrap_or_else(|err| {
                warnings.push(err);
                Decimal::ZERO
            })
        };

        let solde_a_linstant = optional(BalanceField::SoldeALinstant, &ledger.solde_a_linstant);
        let fond = optional(BalanceField::Fond, &ledger.fond);
        let solde_de_debut = validate_field(BalanceField::SoldeDeDebut, &ledger.solde_de_debut)?;

        let balances = Balances {
            solde_de_debut,
            solde_a_linstant,
            fond,
        };
        let totals = LedgerTotals::from_ledger(ledger);
        let total = Self::compute_total(&balances, ledger.multiplier, &totals);

        Ok(Calculation {
            balances,
            multiplier: ledger.multiplier,
            totals,
            total,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::validation::ValidationError;
    use rust_decimal_macros::dec;

    fn reference_ledger() -> Ledger {
        let mut ledger = Ledger::new(Multiplier::OnePointOne);
        ledger.solde_de_debut = "100".into();
        ledger.solde_a_linstant = "20".into();
        ledger.fond = "10".into();
        ledger.retrait_rows[0] = RetraitRow::new("", "30", "OK");
        ledger
    }

    #[test]
    fn test_overflowing_inputs_clamp() {
        let max = Decimal::MAX.to_string();
        let mut ledger = Ledger::new(Multiplier::OnePointThree);
        ledger.solde_de_debut = max.clone();
        ledger.retrait_rows = vec![RetraitRow::new("", &max, "0"), RetraitRow::new("", &max, "0")];
        ledger.depense_rows = vec![DepenseRow::new("", format!("-{max} + -{max}"))];

        let calc = TotalCalculator::compute(&ledger).unwrap();
        assert_eq!(calc.totals.total_retrait, Decimal::MAX);
        assert_eq!(calc.total, Decimal::MAX);
        assert!(calc.result_label().starts_with(&format!("Total: {max}")));
    }

    #[test]
    fn test_reference_total() {
        let calc = TotalCalculator::compute(&reference_ledger()).unwrap();
        assert_eq!(calc.totals.total_retrait, dec!(30));
        assert_eq!(calc.totals.total_retrait_payee, dec!(30));
        assert_eq!(calc.total, dec!(101));
        assert_eq!(calc.result_label(), "Total: 101.0");
        assert!(calc.warnings.is_empty());
    }

    #[test]
    fn test_all_ledgers_contribute() {
        let mut ledger = reference_ledger();
        ledger.credit_rows[0] = CreditRow::new("Ali", "5");
        ledger.credit_payee_rows[0] = CreditPayeeRow::new("Ben", "7");
        ledger.depense_rows[0] = DepenseRow::new("", "1 + 2");
        let calc = TotalCalculator::compute(&ledger).unwrap();
        // 101 - 5 + 7 - 3
        assert_eq!(calc.total, dec!(100));
    }

    #[test]
    fn test_multiplier_scales_net_balance_only() {
        let mut ledger = reference_ledger();
        ledger.multiplier = Multiplier::One;
        let calc = TotalCalculator::compute(&ledger).unwrap();
        // (100 + 30 - 20) - 30 + 10
        assert_eq!(calc.total, dec!(90));
    }

    #[test]
    fn test_missing_opening_balance_aborts() {
        let mut ledger = reference_ledger();
        ledger.solde_de_debut = String::new();
        let err = TotalCalculator::compute(&ledger).unwrap_err();
        assert_eq!(err.field, BalanceField::SoldeDeDebut);
        assert_eq!(err.source, ValidationError::MissingOrInvalid);
    }

    #[test]
    fn test_invalid_optional_field_warns_and_counts_zero() {
        let mut ledger = reference_ledger();
        ledger.fond = "abc".into();
        let calc = TotalCalculator::compute(&ledger).unwrap();
        assert_eq!(calc.balances.fond, Decimal::ZERO);
        assert_eq!(calc.total, dec!(91));
        assert_eq!(calc.warnings.len(), 1);
        assert_eq!(calc.warnings[0].field, BalanceField::Fond);
    }

    #[test]
    fn test_exact_payee_amount_used() {
        let mut ledger = reference_ledger();
        ledger.retrait_rows[0].set_retrait_payee("12");
        let calc = TotalCalculator::compute(&ledger).unwrap();
        assert_eq!(calc.totals.total_retrait_payee, dec!(12));
        assert_eq!(calc.total, dec!(119));
    }
}
