//! Core domain types and logic.

pub mod price_table;
pub mod momentum;
pub mod rebalance;
pub mod portfolio;
pub mod simulator;
pub mod report;
pub mod backtest;
pub mod metrics;
pub mod universe;
pub mod config_validation;
pub mod error;
