//! Shared types, errors, and configuration for Caisse.
//!
//! This crate provides common types used across all other crates:
//! - Amount parsing and one-decimal formatting at the string boundary
//! - Typed IDs for sites and forms
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;


pub use config::AppConfig;
pub use error::AppError;
