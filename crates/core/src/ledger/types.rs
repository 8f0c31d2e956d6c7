//! Ledger row types and the per-form ledger aggregate.
//!
//! A form tracks four ledgers:
//! - credits owed by clients (`CreditRow`)
//! - credits collected (`CreditPayeeRow`)
//! - expenses (`DepenseRow`)
//! - withdrawals and their payee side (`RetraitRow`)
//!
//! The first three share one shape: a free-text `details` sum expression and
//! a cached total. The cache is private and only changes together with
//! `details`, so the two can never drift apart through the public API.

use caisse_shared::types::{format_amount, parse_amount, round_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::validation::ValidationError;
use crate::expression::evaluate;

/// Macro to generate ledger rows holding a sum expression and its cached total.
macro_rules! detail_row {
    ($name:ident, $total:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            /// Client name, matched trimmed and case-sensitive.
            pub client: String,
            details: String,
            $total: Decimal,
        }

        impl $name {
            /// Creates a row and derives its total from `details`.
            #[must_use]
            pub fn new(client: impl Into<String>, details: impl Into<String>) -> Self {
                let mut row = Self {
                    client: client.into(),
                    ..Self::default()
                };
                row.set_details(details);
                row
            }

            /// The free-text sum expression.
            #[must_use]
            pub fn details(&self) -> &str {
                &self.details
            }

            /// Cached total of `details`, rounded to one decimal.
            #[must_use]
            pub fn $total(&self) -> Decimal {
                self.$total
            }

            /// Replaces `details` and re-derives the cached total in the same step.
            pub fn set_details(&mut self, details: impl Into<String>) {
                self.details = details.into();
                self.$total = round_amount(evaluate(&self.details));
            }

            /// Cached total rendered with one decimal.
            #[must_use]
            pub fn display_total(&self) -> String {
                format_amount(self.$total)
            }

            /// Returns true if the row has neither client nor details.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.client.trim().is_empty() && self.details.trim().is_empty()
            }
        }
    };
}

detail_row!(
    CreditRow,
    total_client,
    "Amount a client currently owes, itemized in `details`."
);
detail_row!(
    CreditPayeeRow,
    total_payee,
    "Amount collected against outstanding credit."
);
detail_row!(
    DepenseRow,
    total_depense,
    "Expense subtracted from the total."
);

impl CreditRow {
    /// Overwrites details and total with a settlement outcome.
    ///
    /// Settled details carry strike markup, so the total is no longer the
    /// evaluation of `details` and is set explicitly.
    pub(crate) fn record_settlement(&mut self, details: String, total_client: Decimal) {
        self.details = details;
        self.total_client = total_client;
    }
}

/// Payee side of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RetraitPayee {
    /// The payee amount equals the withdrawal amount (`"OK"`).
    MatchesWithdrawal,
    /// A manually entered payee amount.
    Exact(Decimal),
}

/// Sentinel text for `RetraitPayee::MatchesWithdrawal`.
pub const PAYEE_MATCHES_WITHDRAWAL: &str = "OK";

impl RetraitPayee {
    /// Reads a raw payee field. `"ok"` in any case means fully matched;
    /// anything unreadable counts as zero.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(PAYEE_MATCHES_WITHDRAWAL) {
            Self::MatchesWithdrawal
        } else {
            Self::Exact(parse_amount(trimmed).unwrap_or_default())
        }
    }

    /// Resolves the payee amount for a given withdrawal amount.
    #[must_use]
    pub fn amount(self, retrait: Decimal) -> Decimal {
        match self {
            Self::MatchesWithdrawal => retrait,
            Self::Exact(amount) => amount,
        }
    }
}

impl Default for RetraitPayee {
    fn default() -> Self {
        Self::Exact(Decimal::ZERO)
    }
}

impl From<String> for RetraitPayee {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<RetraitPayee> for String {
    fn from(payee: RetraitPayee) -> Self {
        payee.to_string()
    }
}

impl std::fmt::Display for RetraitPayee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MatchesWithdrawal => f.write_str(PAYEE_MATCHES_WITHDRAWAL),
            Self::Exact(amount) => write!(f, "{amount}"),
        }
    }
}

/// A withdrawal and its payee-settlement amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetraitRow {
    /// Client name, matched trimmed and case-sensitive.
    pub client: String,
    /// Withdrawn amount.
    pub retrait: Decimal,
    /// Payee side of the withdrawal.
    pub retrait_payee: RetraitPayee,
}

impl RetraitRow {
    /// Creates a withdrawal row from raw field text.
    #[must_use]
    pub fn new(client: impl Into<String>, retrait: &str, retrait_payee: &str) -> Self {
        Self {
            client: client.into(),
            retrait: parse_amount(retrait).unwrap_or_default(),
            retrait_payee: RetraitPayee::parse(retrait_payee),
        }
    }

    /// Sets the withdrawn amount from raw text and marks the payee side as
    /// fully matched.
    pub fn set_retrait(&mut self, raw: &str) {
        self.retrait = parse_amount(raw).unwrap_or_default();
        self.retrait_payee = RetraitPayee::MatchesWithdrawal;
    }

    /// Sets the payee side from raw text.
    pub fn set_retrait_payee(&mut self, raw: &str) {
        self.retrait_payee = RetraitPayee::parse(raw);
    }

    /// Payee amount resolved against this row's withdrawal.
    #[must_use]
    pub fn payee_amount(&self) -> Decimal {
        self.retrait_payee.amount(self.retrait)
    }
}

/// Selectable multiplier applied to the net balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Multiplier {
    /// `1`
    One,
    /// `1.1`
    #[default]
    OnePointOne,
    /// `1.2`
    OnePointTwo,
    /// `1.3`
    OnePointThree,
}

impl Multiplier {
    /// All selectable multipliers, in display order.
    pub const ALL: [Self; 4] = [
        Self::One,
        Self::OnePointOne,
        Self::OnePointTwo,
        Self::OnePointThree,
    ];

    /// Numeric value of the multiplier.
    #[must_use]
    pub fn value(self) -> Decimal {
        match self {
            Self::One => Decimal::ONE,
            Self::OnePointOne => Decimal::new(11, 1),
            Self::OnePointTwo => Decimal::new(12, 1),
            Self::OnePointThree => Decimal::new(13, 1),
        }
    }

    /// Label used by forms and persisted state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::OnePointOne => "1.1",
            Self::OnePointTwo => "1.2",
            Self::OnePointThree => "1.3",
        }
    }
}

impl std::fmt::Display for Multiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Multiplier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "1.0" => Ok(Self::One),
            "1.1" => Ok(Self::OnePointOne),
            "1.2" => Ok(Self::OnePointTwo),
            "1.3" => Ok(Self::OnePointThree),
            other => Err(ValidationError::InvalidMultiplier(other.to_string())),
        }
    }
}

impl TryFrom<String> for Multiplier {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Multiplier> for String {
    fn from(multiplier: Multiplier) -> Self {
        multiplier.as_str().to_string()
    }
}

/// The four ledgers of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    /// Credits owed.
    Credit,
    /// Credits collected.
    CreditPayee,
    /// Expenses.
    Depense,
    /// Withdrawals.
    Retrait,
}

impl std::fmt::Display for RowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Credit => "credit",
            Self::CreditPayee => "creditPayee",
            Self::Depense => "depense",
            Self::Retrait => "retrait",
        };
        f.write_str(name)
    }
}

/// Editable field values of a form: multiplier, raw balances and the four ledgers.
///
/// Balances stay raw text until calculation so that validation can report
/// a missing opening balance against the field the operator typed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    /// Selected multiplier.
    pub multiplier: Multiplier,
    /// Manual cash-float adjustment (optional, single amount).
    pub fond: String,
    /// Observed balance (optional, sum expression).
    pub solde_a_linstant: String,
    /// Opening balance (mandatory, sum expression).
    pub solde_de_debut: String,
    /// Credits owed by clients.
    pub credit_rows: Vec<CreditRow>,
    /// Credits collected.
    pub credit_payee_rows: Vec<CreditPayeeRow>,
    /// Expenses.
    pub depense_rows: Vec<DepenseRow>,
    /// Withdrawals.
    pub retrait_rows: Vec<RetraitRow>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Multiplier::default())
    }
}

impl Ledger {
    /// Creates an empty ledger with one blank row in each collection.
    #[must_use]
    pub fn new(multiplier: Multiplier) -> Self {
        Self {
            multiplier,
            fond: String::new(),
            solde_a_linstant: String::new(),
            solde_de_debut: String::new(),
            credit_rows: vec![CreditRow::default()],
            credit_payee_rows: vec![CreditPayeeRow::default()],
            depense_rows: vec![DepenseRow::default()],
            retrait_rows: vec![RetraitRow::default()],
        }
    }

    /// Number of rows in a ledger.
    #[must_use]
    pub fn row_count(&self, kind: RowKind) -> usize {
        match kind {
            RowKind::Credit => self.credit_rows.len(),
            RowKind::CreditPayee => self.credit_payee_rows.len(),
            RowKind::Depense => self.depense_rows.len(),
            RowKind::Retrait => self.retrait_rows.len(),
        }
    }

    /// Appends a blank row.
    pub fn add_row(&mut self, kind: RowKind) {
        match kind {
            RowKind::Credit => self.credit_rows.push(CreditRow::default()),
            RowKind::CreditPayee => self.credit_payee_rows.push(CreditPayeeRow::default()),
            RowKind::Depense => self.depense_rows.push(DepenseRow::default()),
            RowKind::Retrait => self.retrait_rows.push(RetraitRow::default()),
        }
    }

    /// Removes a row. Every ledger keeps at least one row, so removing the
    /// last remaining one is a no-op. Returns true if a row was removed.
    pub fn remove_row(&mut self, kind: RowKind, index: usize) -> bool {
        fn remove<T>(rows: &mut Vec<T>, index: usize) -> bool {
            if rows.len() > 1 && index < rows.len() {
                rows.remove(index);
                true
            } else {
                false
            }
        }

        match kind {
            RowKind::Credit => remove(&mut self.credit_rows, index),
            RowKind::CreditPayee => remove(&mut self.credit_payee_rows, index),
            RowKind::Depense => remove(&mut self.depense_rows, index),
            RowKind::Retrait => remove(&mut self.retrait_rows, index),
        }
    }

    /// Mutable access to a credit row.
    pub fn credit_row_mut(&mut self, index: usize) -> Result<&mut CreditRow, LedgerError> {
        self.credit_rows
            .get_mut(index)
            .ok_or(LedgerError::RowNotFound {
                kind: RowKind::Credit,
                index,
            })
    }

    /// Mutable access to a collected-credit row.
    pub fn credit_payee_row_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut CreditPayeeRow, LedgerError> {
        self.credit_payee_rows
            .get_mut(index)
            .ok_or(LedgerError::RowNotFound {
                kind: RowKind::CreditPayee,
                index,
            })
    }

    /// Mutable access to an expense row.
    pub fn depense_row_mut(&mut self, index: usize) -> Result<&mut DepenseRow, LedgerError> {
        self.depense_rows
            .get_mut(index)
            .ok_or(LedgerError::RowNotFound {
                kind: RowKind::Depense,
                index,
            })
    }

    /// Mutable access to a withdrawal row.
    pub fn retrait_row_mut(&mut self, index: usize) -> Result<&mut RetraitRow, LedgerError> {
        self.retrait_rows
            .get_mut(index)
            .ok_or(LedgerError::RowNotFound {
                kind: RowKind::Retrait,
                index,
            })
    }
}
