//! Core domain types and logic.

pub mod calendar;
pub mod price_series;
pub mod portfolio;
pub mod rebalance;
pub mod registry;
pub mod settings;
pub mod error;
