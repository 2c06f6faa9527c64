//! Core domain types and logic.

pub mod price;
pub mod series;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod ledger;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
