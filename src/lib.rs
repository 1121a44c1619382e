//! stockfolio: stock portfolio valuation engine.
//!
//! Hexagonal architecture: price series, portfolios and the registry live in
//! [`domain`], port traits in [`ports`], file-backed implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
