//! Daily closing-price history for one ticker symbol, with gain/loss,
//! trailing moving average and crossover analytics.
//!
//! Moving averages tolerate gaps in the calendar: the mean is taken over the
//! days that actually have a price. Gain/loss does not: both endpoints must
//! be recorded.

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::calendar::{days_inclusive, trailing_days};
use super::error::StockfolioError;

/// Handle to a series shared between portfolios. Appends through one handle
/// are visible through every other.
pub type SharedSeries = Rc<RefCell<PriceSeries>>;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    prices: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>) -> Self {
        PriceSeries {
            symbol: symbol.into(),
            prices: BTreeMap::new(),
        }
    }

    /// Wraps the series in a shareable handle.
    pub fn into_shared(self) -> SharedSeries {
        Rc::new(RefCell::new(self))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.prices.get(&date).copied()
    }

    /// Recorded `(date, price)` pairs in chronological order.
    pub fn prices(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.prices.iter().map(|(&d, &p)| (d, p))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.prices.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.prices.keys().next_back().copied()
    }

    /// Records the closing price for `date`, replacing any earlier value.
    pub fn add_price(&mut self, date: NaiveDate, price: f64) -> Result<(), StockfolioError> {
        if !price.is_finite() || price < 0.0 {
            return Err(StockfolioError::invalid_input(format!(
                "price for {} on {} must be a non-negative number, got {}",
                self.symbol, date, price
            )));
        }
        if let Some(previous) = self.prices.insert(date, price) {
            tracing::debug!(symbol = %self.symbol, %date, previous, price, "overwrote price");
        }
        Ok(())
    }

    /// `price(end) - price(start)`. Both dates must have a recorded price.
    pub fn gain_loss(&self, start: NaiveDate, end: NaiveDate) -> Result<f64, StockfolioError> {
        StockfolioError::check_range(start, end)?;
        let start_price = self.require_price(start)?;
        let end_price = self.require_price(end)?;
        Ok(end_price - start_price)
    }

    /// Mean closing price over the `window` calendar days ending at `date`.
    ///
    /// Days without a price are left out of both the sum and the count.
    /// Returns `0.0` when no day in the window has a price.
    pub fn moving_average(&self, date: NaiveDate, window: usize) -> Result<f64, StockfolioError> {
        check_window(window)?;
        Ok(self.window_mean(date, window))
    }

    /// Dates in `[start, end]` whose recorded price is strictly above the
    /// `window`-day moving average ending on that date.
    pub fn crossovers(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        window: usize,
    ) -> Result<Vec<NaiveDate>, StockfolioError> {
        StockfolioError::check_range(start, end)?;
        check_window(window)?;
        Ok(days_inclusive(start, end)
            .filter(|&d| {
                self.price_on(d)
                    .is_some_and(|price| price > self.window_mean(d, window))
            })
            .collect())
    }

    fn window_mean(&self, date: NaiveDate, window: usize) -> f64 {
        let (sum, count) = trailing_days(date, window)
            .filter_map(|d| self.price_on(d))
            .fold((0.0, 0usize), |(sum, count), p| (sum + p, count + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    fn require_price(&self, date: NaiveDate) -> Result<f64, StockfolioError> {
        self.price_on(date).ok_or_else(|| StockfolioError::MissingData {
            symbol: self.symbol.clone(),
            date,
        })
    }
}

fn check_window(window: usize) -> Result<(), StockfolioError> {
    if window == 0 {
        return Err(StockfolioError::invalid_input(
            "moving average window must be greater than 0",
        ));
    }
    Ok(())
}
