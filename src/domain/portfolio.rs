//! Portfolio holdings and valuation.
//!
//! A portfolio maps ticker symbols to share quantities and keeps a shared
//! handle to each symbol's price series. Holdings are a single current state;
//! they are not versioned by date. A quantity is always positive: anything
//! that would leave zero or less drops the holding and its series binding.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use super::calendar::days_inclusive;
use super::error::{LookupKind, StockfolioError};
use super::price_series::SharedSeries;
use super::rebalance::RebalanceTarget;

#[derive(Debug, Clone)]
pub struct Holding {
    pub quantity: f64,
    /// `None` for holdings restored from disk before quotes are bound.
    pub series: Option<SharedSeries>,
}

impl Holding {
    fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.series.as_ref()?.borrow().price_on(date)
    }

    fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.price_on(date).map(|price| self.quantity * price)
    }
}

#[derive(Debug, Clone)]
pub struct Portfolio {
    name: String,
    holdings: BTreeMap<String, Holding>,
}

impl Portfolio {
    pub fn new(name: impl Into<String>) -> Self {
        Portfolio {
            name: name.into(),
            holdings: BTreeMap::new(),
        }
    }

    /// Rebuilds a portfolio from persisted `(symbol, quantity)` pairs. No
    /// series are bound; non-positive quantities are dropped.
    pub fn restore<I>(name: impl Into<String>, quantities: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let holdings = quantities
            .into_iter()
            .filter(|(_, quantity)| *quantity > 0.0)
            .map(|(symbol, quantity)| {
                (
                    symbol,
                    Holding {
                        quantity,
                        series: None,
                    },
                )
            })
            .collect();
        Portfolio {
            name: name.into(),
            holdings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.holdings.contains_key(symbol)
    }

    pub fn quantity(&self, symbol: &str) -> Option<f64> {
        self.holdings.get(symbol).map(|h| h.quantity)
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    /// Buys `shares` more of `symbol`, adding to any existing quantity, and
    /// binds `series` as its price source.
    pub fn add_stock(
        &mut self,
        symbol: &str,
        shares: f64,
        series: SharedSeries,
    ) -> Result<(), StockfolioError> {
        if !shares.is_finite() || shares <= 0.0 {
            return Err(StockfolioError::invalid_input(format!(
                "shares to add must be positive, got {shares}"
            )));
        }
        let holding = self
            .holdings
            .entry(symbol.to_string())
            .or_insert(Holding {
                quantity: 0.0,
                series: None,
            });
        holding.quantity += shares;
        holding.series = Some(series);
        tracing::debug!(portfolio = %self.name, symbol, shares, "added shares");
        Ok(())
    }

    /// Sets the quantity of `symbol` to exactly `shares` (not additive) and
    /// rebinds `series`. Setting zero removes the holding.
    pub fn update_stock(
        &mut self,
        symbol: &str,
        shares: f64,
        series: SharedSeries,
    ) -> Result<(), StockfolioError> {
        if !shares.is_finite() || shares < 0.0 {
            return Err(StockfolioError::invalid_input(format!(
                "share quantity cannot be negative, got {shares}"
            )));
        }
        if shares == 0.0 {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(
                symbol.to_string(),
                Holding {
                    quantity: shares,
                    series: Some(series),
                },
            );
        }
        tracing::debug!(portfolio = %self.name, symbol, shares, "set quantity");
        Ok(())
    }

    /// Sells `shares` of `symbol`. Selling the whole position or more drops
    /// the holding. Unknown symbols are ignored.
    pub fn remove_stock(
        &mut self,
        symbol: &str,
        shares: f64,
        date: NaiveDate,
    ) -> Result<(), StockfolioError> {
        if !shares.is_finite() || shares <= 0.0 {
            return Err(StockfolioError::invalid_input(format!(
                "shares to remove must be positive, got {shares}"
            )));
        }
        let Some(holding) = self.holdings.get_mut(symbol) else {
            return Ok(());
        };
        holding.quantity -= shares;
        if holding.quantity <= 0.0 {
            self.holdings.remove(symbol);
        }
        tracing::debug!(portfolio = %self.name, symbol, shares, %date, "removed shares");
        Ok(())
    }

    /// Binds a price series to a symbol already held, leaving the quantity alone.
    pub fn bind_series(&mut self, symbol: &str, series: SharedSeries) -> Result<(), StockfolioError> {
        let holding = self
            .holdings
            .get_mut(symbol)
            .ok_or_else(|| StockfolioError::not_found(LookupKind::Symbol, symbol))?;
        holding.series = Some(series);
        Ok(())
    }

    pub fn unbound_symbols(&self) -> Vec<String> {
        self.holdings
            .iter()
            .filter(|(_, h)| h.series.is_none())
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// Current symbol → quantity snapshot. `date` does not select a historical
    /// state; holdings are not versioned.
    pub fn composition(&self, _date: NaiveDate) -> BTreeMap<String, f64> {
        self.holdings
            .iter()
            .map(|(symbol, h)| (symbol.clone(), h.quantity))
            .collect()
    }

    /// Market value on `date`. Holdings with no price that day count as zero.
    pub fn value(&self, date: NaiveDate) -> f64 {
        self.holdings.values().filter_map(|h| h.value_on(date)).sum()
    }

    /// Percentage of total value held in each symbol priced on `date`.
    /// Empty when the portfolio is worth nothing that day.
    pub fn value_distribution(&self, date: NaiveDate) -> BTreeMap<String, f64> {
        let total = self.value(date);
        if total == 0.0 {
            return BTreeMap::new();
        }
        self.holdings
            .iter()
            .filter_map(|(symbol, h)| {
                h.value_on(date)
                    .map(|value| (symbol.clone(), value / total * 100.0))
            })
            .collect()
    }

    /// Rebalances to `weights` as of `date`. A map containing `ALL` selects
    /// equal weighting; otherwise each entry is a fraction of total value.
    pub fn rebalance(
        &mut self,
        weights: &HashMap<String, f64>,
        date: NaiveDate,
    ) -> Result<(), StockfolioError> {
        let target = RebalanceTarget::from_weights(weights)?;
        self.rebalance_to(&target, date);
        Ok(())
    }

    /// Symbols that are not held, not bound, or have no positive price on
    /// `date` keep their current quantity.
    pub fn rebalance_to(&mut self, target: &RebalanceTarget, date: NaiveDate) {
        let total = self.value(date);
        let weights: Vec<(String, f64)> = match target {
            RebalanceTarget::EqualWeight => {
                if self.holdings.is_empty() {
                    return;
                }
                let weight = 1.0 / self.holdings.len() as f64;
                self.holdings.keys().map(|s| (s.clone(), weight)).collect()
            }
            RebalanceTarget::Weighted(map) => {
                map.iter().map(|(s, w)| (s.clone(), *w)).collect()
            }
        };

        for (symbol, weight) in weights {
            let price = match self.holdings.get(&symbol).and_then(|h| h.price_on(date)) {
                Some(price) if price > 0.0 => price,
                _ => {
                    tracing::debug!(portfolio = %self.name, %symbol, %date, "no usable price, not rebalanced");
                    continue;
                }
            };
            let shares = total * weight / price;
            if shares > 0.0 {
                if let Some(holding) = self.holdings.get_mut(&symbol) {
                    holding.quantity = shares;
                }
            } else {
                self.holdings.remove(&symbol);
            }
        }
        tracing::info!(portfolio = %self.name, %date, total, "rebalanced");
    }

    /// Portfolio value for every calendar day from `start` to `end` inclusive.
    pub fn performance(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<f64>, StockfolioError> {
        StockfolioError::check_range(start, end)?;
        Ok(days_inclusive(start, end).map(|d| self.value(d)).collect())
    }
}
