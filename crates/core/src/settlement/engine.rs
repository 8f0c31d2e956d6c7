//! Credit versus withdrawal netting.
//!
//! For each credit row, the client's withdrawal total is compared with the
//! row's credit total:
//! - equal: the details are struck and the total becomes zero
//! - withdrawals larger: same, and the excess is offered as a collected credit
//! - credit larger: items are sorted ascending and consumed smallest first
//!
//! Withdrawal rows are never modified.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use caisse_shared::types::{format_amount, parse_amount};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::markup::{is_struck, strike};
use super::plan::{
    CreditAdjustment, ExcessCredit, SettlementOutcome, SettlementPlan, SettlementSummary,
};
use crate::expression::segments;
use crate::ledger::{CreditRow, Ledger, LedgerError, RetraitRow};

/// Separator used when rendering settled items.
const ITEM_JOIN: &str = " + ";

/// Settlement engine for credit netting.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Sums withdrawals per trimmed client name. Unnamed rows are ignored.
    #[must_use]
    pub fn withdrawal_totals(retrait_rows: &[RetraitRow]) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for row in retrait_rows {
            let client = row.client.trim();
            if client.is_empty() {
                continue;
            }
            let total = totals.entry(client.to_string()).or_insert(Decimal::ZERO);
            *total = total.saturating_add(row.retrait);
        }
        totals
    }

    /// Computes the settlement of `credit_rows` against `retrait_rows`.
    ///
    /// Rows are skipped when they have no client, when their client has no
    /// withdrawal, or when they are already struck with a zero total.
    #[must_use]
    pub fn compute_plan(credit_rows: &[CreditRow], retrait_rows: &[RetraitRow]) -> SettlementPlan {
        let withdrawals = Self::withdrawal_totals(retrait_rows);
        let mut plan = SettlementPlan::default();

        for (row_index, row) in credit_rows.iter().enumerate() {
            let client = row.client.trim();
            if client.is_empty() {
                continue;
            }
            let Some(&withdrawal_total) = withdrawals.get(client) else {
                continue;
            };
            if withdrawal_total.is_zero() {
                continue;
            }
            if row.total_client().is_zero() && is_struck(row.details()) {
                continue;
            }

            let credit_total = row.total_client();
            let (details, total_client, outcome) = match credit_total.cmp(&withdrawal_total) {
                Ordering::Equal => (
                    strike(row.details()),
                    Decimal::ZERO,
                    SettlementOutcome::PaidInFull,
                ),
                Ordering::Less => {
                    let excess = withdrawal_total.saturating_sub(credit_total);
                    plan.excess_credits.push(ExcessCredit {
                        client: client.to_string(),
                        amount: excess,
                    });
                    (
                        strike(row.details()),
                        Decimal::ZERO,
                        SettlementOutcome::Overpaid { excess },
                    )
                }
                Ordering::Greater => {
                    let remaining = credit_total.saturating_sub(withdrawal_total);
                    (
                        Self::allocate(row.details(), withdrawal_total),
                        remaining,
                        SettlementOutcome::Partial { remaining },
                    )
                }
            };

            debug!(
                client,
                row_index,
                %credit_total,
                %withdrawal_total,
                ?outcome,
                "Planned credit settlement"
            );

            plan.adjustments.push(CreditAdjustment {
                row_index,
                client: client.to_string(),
                credit_total,
                withdrawal_total,
                details,
                total_client,
                outcome,
            });
        }

        plan
    }

    /// Consumes `withdrawal` against the items of `details`, smallest first.
    ///
    /// Fully covered items are struck, the item the pool runs out on is
    /// split into `struck + remaining`, and later items are left as they
    /// are. Items are rendered with one decimal. Segments that are not
    /// numbers, such as earlier struck spans, are kept verbatim first.
    #[must_use]
    pub fn allocate(details: &str, withdrawal: Decimal) -> String {
        let mut carried = Vec::new();
        let mut items = Vec::new();
        for segment in segments(details).map(str::trim) {
            if segment.is_empty() {
                continue;
            }
            match parse_amount(segment) {
                Some(amount) => items.push(amount),
                None => carried.push(segment.to_string()),
            }
        }
        // Stable, so equal items keep their original order.
        items.sort();

        let mut pool = withdrawal;
        let mut rendered = carried;
        for item in items {
            if pool >= item {
                pool = pool.saturating_sub(item);
                rendered.push(strike(&format_amount(item)));
            } else if pool > Decimal::ZERO {
                let settled = pool;
                pool = Decimal::ZERO;
                rendered.push(format!(
                    "{}{ITEM_JOIN}{}",
                    strike(&format_amount(settled)),
                    format_amount(item.saturating_sub(settled))
                ));
            } else {
                rendered.push(format_amount(item));
            }
        }

        rendered.join(ITEM_JOIN)
    }

    /// Applies a plan to `ledger`.
    ///
    /// `confirm` is asked once per excess credit; accepted ones are appended
    /// to the collected-credit ledger. Declined ones leave the zeroed credit
    /// row without a compensating entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::RowNotFound` if the plan refers to a credit row
    /// that no longer exists. Rows before the missing one are already updated.
    pub fn apply_plan<F>(
        plan: SettlementPlan,
        ledger: &mut Ledger,
        mut confirm: F,
    ) -> Result<SettlementSummary, LedgerError>
    where
        F: FnMut(&ExcessCredit) -> bool,
    {
        let mut summary = SettlementSummary::default();

        for adjustment in plan.adjustments {
            let row = ledger.credit_row_mut(adjustment.row_index)?;
            row.record_settlement(adjustment.details, adjustment.total_client);
            summary.rows_settled += 1;
        }

        for excess in plan.excess_credits {
            if confirm(&excess) {
                info!(client = %excess.client, amount = %excess.amount, "Excess credit accepted");
                ledger.credit_payee_rows.push(excess.to_credit_payee_row());
                summary.accepted.push(excess);
            } else {
                info!(client = %excess.client, amount = %excess.amount, "Excess credit declined");
                summary.declined.push(excess);
            }
        }

        Ok(summary)
    }

    /// Computes and applies the settlement of a ledger in one step.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`SettlementEngine::apply_plan`].
    pub fn settle<F>(ledger: &mut Ledger, confirm: F) -> Result<SettlementSummary, LedgerError>
    where
        F: FnMut(&ExcessCredit) -> bool,
    {
        let plan = Self::compute_plan(&ledger.credit_rows, &ledger.retrait_rows);
        let summary = Self::apply_plan(plan, ledger, confirm)?;
        info!(
            rows_settled = summary.rows_settled,
            accepted = summary.accepted.len(),
            declined = summary.declined.len(),
            "Settlement applied"
        );
        Ok(summary)
    }
}
