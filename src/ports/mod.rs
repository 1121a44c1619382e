//! Port traits implemented by [`crate::adapters`].

pub mod config_port;
pub mod portfolio_store_port;
pub mod quote_port;
