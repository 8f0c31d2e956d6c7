//! Settlement plan types.
//!
//! A plan is computed without touching the ledger. Applying it is a
//! separate step, so the excess-credit confirmation can be answered by
//! whoever drives the session.

use caisse_shared::types::format_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::CreditPayeeRow;

/// How a credit row compares with its client's withdrawals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SettlementOutcome {
    /// Withdrawals equal the credit.
    PaidInFull,
    /// Withdrawals exceed the credit by `excess`.
    Overpaid {
        /// Withdrawal amount beyond the credit.
        excess: Decimal,
    },
    /// Withdrawals cover part of the credit.
    Partial {
        /// Credit left outstanding.
        remaining: Decimal,
    },
}

/// New details and total for one credit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAdjustment {
    /// Index of the credit row in its ledger.
    pub row_index: usize,
    /// Trimmed client name.
    pub client: String,
    /// Credit total before settlement.
    pub credit_total: Decimal,
    /// Withdrawal total for the client.
    pub withdrawal_total: Decimal,
    /// Rendered details after settlement.
    pub details: String,
    /// Credit total after settlement.
    pub total_client: Decimal,
    /// Comparison outcome.
    pub outcome: SettlementOutcome,
}

/// Withdrawal amount beyond a client's credit, pending confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcessCredit {
    /// Trimmed client name.
    pub client: String,
    /// Excess amount.
    pub amount: Decimal,
}

impl ExcessCredit {
    /// Collected-credit row recording the excess.
    #[must_use]
    pub fn to_credit_payee_row(&self) -> CreditPayeeRow {
        CreditPayeeRow::new(self.client.clone(), format_amount(self.amount))
    }
}

/// Proposed changes to a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPlan {
    /// Credit rows to rewrite, in ledger order.
    pub adjustments: Vec<CreditAdjustment>,
    /// Excess credits awaiting confirmation, in ledger order.
    pub excess_credits: Vec<ExcessCredit>,
}

impl SettlementPlan {
    /// Returns true if applying the plan would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty() && self.excess_credits.is_empty()
    }
}

/// What applying a plan did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSummary {
    /// Number of credit rows rewritten.
    pub rows_settled: usize,
    /// Excess credits added as collected-credit rows.
    pub accepted: Vec<ExcessCredit>,
    /// Excess credits the operator declined.
    pub declined: Vec<ExcessCredit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_excess_credit_row() {
        let excess = ExcessCredit {
            client: "Cat".into(),
            amount: dec!(30),
        };
        let row = excess.to_credit_payee_row();
        assert_eq!(row.client, "Cat");
        assert_eq!(row.details(), "30.0");
        assert_eq!(row.total_payee(), dec!(30));
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(SettlementOutcome::Partial {
            remaining: dec!(15),
        })
        .unwrap();
        assert_eq!(json["type"], "partial");
        assert_eq!(json["remaining"], "15");
    }

    #[test]
    fn test_empty_plan() {
        assert!(SettlementPlan::default().is_empty());
    }
}
