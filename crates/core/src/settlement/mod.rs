//! Netting of client credits against their withdrawals.
//!
//! Settlement runs in two phases: [`SettlementEngine::compute_plan`] is
//! pure, and [`SettlementEngine::apply_plan`] mutates the ledger, asking a
//! confirmation callback before recording any excess credit.

pub mod engine;
pub mod markup;
pub mod plan;


pub use engine::SettlementEngine;
pub use markup::{STRIKE_CLOSE, STRIKE_OPEN, is_struck, strike};
pub use plan::{
    CreditAdjustment, ExcessCredit, SettlementOutcome, SettlementPlan, SettlementSummary,
};
