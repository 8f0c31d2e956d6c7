//! Core reconciliation logic for Caisse.
//!
//! This crate contains pure calculation logic with ZERO UI or network dependencies.
//! Raw field text comes in, formatted totals and settled ledgers come out.
//!
//! # Modules
//!
//! - `expression` - `+`-joined sum evaluation
//! - `voice` - Spoken transcript normalization
//! - `ledger` - Form ledgers, validation and the grand total
//! - `settlement` - Credit versus withdrawal netting
//! - `session` - Sites, forms and calculation history
//! - `storage` - Key-value persistence

pub mod expression;
pub mod ledger;
pub mod session;
pub mod settlement;
pub mod storage;
pub mod voice;
