//! Form ledgers and the grand-total calculation.
//!
//! This module implements:
//! - Ledger row types with cached totals
//! - Balance field validation
//! - The grand-total formula
//! - Error types for row addressing

pub mod error;
pub mod total;
pub mod types;
pub mod validation;

#[cfg(test)]
mod total_props;

pub use error::LedgerError;
pub use total::{Balances, Calculation, LedgerTotals, TotalCalculator};
pub use types::{
    CreditPayeeRow, CreditRow, DepenseRow, Ledger, Multiplier, PAYEE_MATCHES_WITHDRAWAL,
    RetraitPayee, RetraitRow, RowKind,
};
pub use validation::{BalanceField, FieldError, ValidationError, validate, validate_field};
