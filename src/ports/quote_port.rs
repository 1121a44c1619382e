//! Quote source port.

use crate::domain::error::StockfolioError;
use crate::domain::price_series::PriceSeries;

/// Supplies a completed closing-price history for a ticker symbol.
pub trait QuoteSource {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, StockfolioError>;
}
