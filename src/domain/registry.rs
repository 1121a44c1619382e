//! Named portfolios and the price series they share.
//!
//! Every portfolio operation is addressed by portfolio name; an unknown name
//! is reported as `NotFound` here rather than surfacing from inside the
//! portfolio itself.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::error::{LookupKind, StockfolioError};
use super::portfolio::Portfolio;
use super::price_series::{PriceSeries, SharedSeries};
use super::rebalance::RebalanceTarget;
use crate::ports::portfolio_store_port::PortfolioStore;
use crate::ports::quote_port::QuoteSource;

#[derive(Debug, Default)]
pub struct PortfolioRegistry {
    portfolios: HashMap<String, Portfolio>,
    series: HashMap<String, SharedSeries>,
}

impl PortfolioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) -> Result<(), StockfolioError> {
        validate_name(name)?;
        if self.portfolios.contains_key(name) {
            return Err(StockfolioError::AlreadyExists {
                name: name.to_string(),
            });
        }
        self.portfolios
            .insert(name.to_string(), Portfolio::new(name));
        tracing::info!(portfolio = name, "created portfolio");
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.portfolios.contains_key(name)
    }

    /// Portfolio names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.portfolios.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Result<&Portfolio, StockfolioError> {
        self.portfolios
            .get(name)
            .ok_or_else(|| StockfolioError::not_found(LookupKind::Portfolio, name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Portfolio, StockfolioError> {
        self.portfolios
            .get_mut(name)
            .ok_or_else(|| StockfolioError::not_found(LookupKind::Portfolio, name))
    }

    pub fn remove(&mut self, name: &str) -> Result<Portfolio, StockfolioError> {
        self.portfolios
            .remove(name)
            .ok_or_else(|| StockfolioError::not_found(LookupKind::Portfolio, name))
    }

    /// Stores `series` under its symbol, replacing any earlier entry, and
    /// returns the shared handle. Portfolios keep whatever handle they were
    /// bound to until they are rebound.
    pub fn add_series(&mut self, series: PriceSeries) -> SharedSeries {
        let symbol = series.symbol().to_string();
        let shared = series.into_shared();
        self.series.insert(symbol, Rc::clone(&shared));
        shared
    }

    pub fn series(&self, symbol: &str) -> Option<SharedSeries> {
        self.series.get(symbol).cloned()
    }

    fn require_series(&self, symbol: &str) -> Result<SharedSeries, StockfolioError> {
        self.series(symbol)
            .ok_or_else(|| StockfolioError::not_found(LookupKind::Series, symbol))
    }

    pub fn add_stock(
        &mut self,
        name: &str,
        symbol: &str,
        shares: f64,
        date: NaiveDate,
    ) -> Result<(), StockfolioError> {
        self.get(name)?;
        let series = self.require_series(symbol)?;
        self.get_mut(name)?.add_stock(symbol, shares, series)?;
        tracing::info!(portfolio = name, symbol, shares, %date, "bought shares");
        Ok(())
    }

    pub fn update_stock(
        &mut self,
        name: &str,
        symbol: &str,
        shares: f64,
    ) -> Result<(), StockfolioError> {
        self.get(name)?;
        let series = self.require_series(symbol)?;
        self.get_mut(name)?.update_stock(symbol, shares, series)
    }

    pub fn remove_stock(
        &mut self,
        name: &str,
        symbol: &str,
        shares: f64,
        date: NaiveDate,
    ) -> Result<(), StockfolioError> {
        self.get_mut(name)?.remove_stock(symbol, shares, date)?;
        tracing::info!(portfolio = name, symbol, shares, %date, "sold shares");
        Ok(())
    }

    pub fn composition(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> Result<BTreeMap<String, f64>, StockfolioError> {
        Ok(self.get(name)?.composition(date))
    }

    pub fn value(&self, name: &str, date: NaiveDate) -> Result<f64, StockfolioError> {
        Ok(self.get(name)?.value(date))
    }

    pub fn value_distribution(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> Result<BTreeMap<String, f64>, StockfolioError> {
        Ok(self.get(name)?.value_distribution(date))
    }

    pub fn rebalance(
        &mut self,
        name: &str,
        weights: &HashMap<String, f64>,
        date: NaiveDate,
    ) -> Result<(), StockfolioError> {
        self.get_mut(name)?.rebalance(weights, date)
    }

    pub fn rebalance_to(
        &mut self,
        name: &str,
        target: &RebalanceTarget,
        date: NaiveDate,
    ) -> Result<(), StockfolioError> {
        self.get_mut(name)?.rebalance_to(target, date);
        Ok(())
    }

    pub fn performance(
        &self,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<f64>, StockfolioError> {
        self.get(name)?.performance(start, end)
    }

    /// Binds a series to every holding of `name` that has none, reusing the
    /// stored series or fetching a new one from `source`. Returns how many
    /// holdings were bound.
    pub fn bind_quotes(
        &mut self,
        name: &str,
        source: &dyn QuoteSource,
    ) -> Result<usize, StockfolioError> {
        let unbound = self.get(name)?.unbound_symbols();
        for symbol in &unbound {
            let series = self.series_or_fetch(symbol, source)?;
            self.get_mut(name)?.bind_series(symbol, series)?;
        }
        Ok(unbound.len())
    }

    /// Like [`bind_quotes`](Self::bind_quotes), but a symbol whose quotes
    /// cannot be fetched stays unbound and values to zero. Returns the
    /// symbols left unbound.
    pub fn bind_available_quotes(
        &mut self,
        name: &str,
        source: &dyn QuoteSource,
    ) -> Result<Vec<String>, StockfolioError> {
        let unbound = self.get(name)?.unbound_symbols();
        let mut unavailable = Vec::new();
        for symbol in unbound {
            match self.series_or_fetch(&symbol, source) {
                Ok(series) => self.get_mut(name)?.bind_series(&symbol, series)?,
                Err(e) => {
                    tracing::warn!(portfolio = name, %symbol, error = %e, "quotes unavailable, holding left unpriced");
                    unavailable.push(symbol);
                }
            }
        }
        Ok(unavailable)
    }

    fn series_or_fetch(
        &mut self,
        symbol: &str,
        source: &dyn QuoteSource,
    ) -> Result<SharedSeries, StockfolioError> {
        if let Some(series) = self.series(symbol) {
            return Ok(series);
        }
        tracing::debug!(%symbol, "fetching quotes");
        Ok(self.add_series(source.fetch_series(symbol)?))
    }

    pub fn save(&self, name: &str, store: &dyn PortfolioStore) -> Result<(), StockfolioError> {
        store.save(self.get(name)?)?;
        tracing::info!(portfolio = name, "saved portfolio");
        Ok(())
    }

    /// Loads `name` from `store`, replacing any portfolio already registered
    /// under the name recorded in the file. Returns that recorded name.
    pub fn load(
        &mut self,
        name: &str,
        store: &dyn PortfolioStore,
    ) -> Result<String, StockfolioError> {
        let portfolio = store.load(name)?;
        let loaded = portfolio.name().to_string();
        if self.portfolios.insert(loaded.clone(), portfolio).is_some() {
            tracing::warn!(portfolio = %loaded, "replaced portfolio with loaded copy");
        }
        tracing::info!(portfolio = %loaded, "loaded portfolio");
        Ok(loaded)
    }
}

/// Portfolio names head their save file, so they must be a single non-empty line.
pub fn validate_name(name: &str) -> Result<(), StockfolioError> {
    if name.trim().is_empty() {
        return Err(StockfolioError::invalid_input("portfolio name cannot be empty"));
    }
    if name.contains(['\n', '\r']) {
        return Err(StockfolioError::invalid_input(
            "portfolio name must be a single line",
        ));
    }
    Ok(())
}
