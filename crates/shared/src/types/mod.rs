//! Common types used across the workspace.

pub mod id;
pub mod money;


pub use id::*;
pub use money::{
    RESULT_PREFIX, format_amount, parse_amount, parse_result_label, result_label, round_amount,
    saturating_sum,
};
