//! Portfolio persistence port.

use crate::domain::error::StockfolioError;
use crate::domain::portfolio::Portfolio;

/// Saves and restores portfolio holdings by portfolio name. Price history is
/// never persisted.
pub trait PortfolioStore {
    fn save(&self, portfolio: &Portfolio) -> Result<(), StockfolioError>;

    fn load(&self, name: &str) -> Result<Portfolio, StockfolioError>;

    fn list(&self) -> Result<Vec<String>, StockfolioError>;
}
