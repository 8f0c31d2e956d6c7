//! Balance field validation.
//!
//! Balances arrive as raw text. Sum fields (`soldeALinstant`, `soldeDeDebut`)
//! are read through the expression evaluator; other fields are a single
//! amount.

use caisse_shared::types::parse_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expression::evaluate;

/// Validation errors for raw field input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// Mandatory field is empty, zero or unreadable.
    #[error("svp insérer un solde de début")]
    MissingOrInvalid,

    /// Optional field holds text that is not a number.
    #[error("Please enter a valid number")]
    InvalidNumber,

    /// Multiplier outside the selectable set.
    #[error("Invalid multiplier: {0}")]
    InvalidMultiplier(String),
}

impl ValidationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingOrInvalid => "MISSING_OR_INVALID",
            Self::InvalidNumber => "INVALID_NUMBER",
            Self::InvalidMultiplier(_) => "INVALID_MULTIPLIER",
        }
    }
}

/// Validates a raw numeric field.
///
/// - Empty and optional: valid, zero.
/// - Mandatory: empty, zero or unreadable is rejected. A zero opening
///   balance therefore cannot be entered.
/// - Sum fields never fail to read: unreadable terms are dropped, so an
///   optional sum field of garbage is zero.
///
/// # Errors
///
/// Returns `MissingOrInvalid` for a rejected mandatory field and
/// `InvalidNumber` for an unreadable optional single-amount field.
pub fn validate(raw: &str, is_mandatory: bool, is_sum_field: bool) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return if is_mandatory {
            Err(ValidationError::MissingOrInvalid)
        } else {
            Ok(Decimal::ZERO)
        };
    }

    let parsed = if is_sum_field {
        Some(evaluate(trimmed))
    } else {
        parse_amount(trimmed)
    };

    match parsed {
        Some(value) if is_mandatory && value.is_zero() => Err(ValidationError::MissingOrInvalid),
        Some(value) => Ok(value),
        None if is_mandatory => Err(ValidationError::MissingOrInvalid),
        None => Err(ValidationError::InvalidNumber),
    }
}

/// The three scalar balance fields of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceField {
    /// Cash-float adjustment.
    Fond,
    /// Observed balance.
    SoldeALinstant,
    /// Opening balance.
    SoldeDeDebut,
}

impl BalanceField {
    /// Whether the field must hold a non-zero amount.
    #[must_use]
    pub const fn is_mandatory(self) -> bool {
        matches!(self, Self::SoldeDeDebut)
    }

    /// Whether the field accepts a `+`-joined sum.
    #[must_use]
    pub const fn is_sum_field(self) -> bool {
        matches!(self, Self::SoldeALinstant | Self::SoldeDeDebut)
    }
}

impl std::fmt::Display for BalanceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fond => "fond",
            Self::SoldeALinstant => "soldeALinstant",
            Self::SoldeDeDebut => "soldeDeDebut",
        };
        f.write_str(name)
    }
}

/// A validation failure attached to the field it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {source}")]
pub struct FieldError {
    /// Field that failed.
    pub field: BalanceField,
    /// Underlying failure.
    pub source: ValidationError,
}

/// Validates a balance field with its own mandatory and sum rules.
///
/// # Errors
///
/// Returns a `FieldError` naming the field when validation fails.
pub fn validate_field(field: BalanceField, raw: &str) -> Result<Decimal, FieldError> {
    validate(raw, field.is_mandatory(), field.is_sum_field())
        .map_err(|source| FieldError { field, source })
}
