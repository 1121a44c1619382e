#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::Cell;
use std::collections::HashMap;
use stockfolio::domain::error::StockfolioError;
pub use stockfolio::domain::price_series::{PriceSeries, SharedSeries};
use stockfolio::ports::quote_port::QuoteSource;

pub struct MockQuoteSource {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.data.insert(series.symbol().to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl QuoteSource for MockQuoteSource {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, StockfolioError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockfolioError::DataSource {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| StockfolioError::DataSource {
                symbol: symbol.to_string(),
                reason: "unknown symbol".to_string(),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_series(symbol: &str, prices: &[(&str, f64)]) -> PriceSeries {
    let mut series = PriceSeries::new(symbol);
    for &(d, price) in prices {
        let d = NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap();
        series.add_price(d, price).unwrap();
    }
    series
}

/// AAPL closing at 100, 105, 110, 115 on 2021-01-01 through 2021-01-04.
pub fn aapl_series() -> PriceSeries {
    make_series(
        "AAPL",
        &[
            ("2021-01-01", 100.0),
            ("2021-01-02", 105.0),
            ("2021-01-03", 110.0),
            ("2021-01-04", 115.0),
        ],
    )
}

/// Consecutive daily closes starting at `start_date`, rising by 1.0 a day.
pub fn generate_series(symbol: &str, start_date: &str, count: usize, start_price: f64) -> PriceSeries {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    let mut series = PriceSeries::new(symbol);
    for i in 0..count {
        series
            .add_price(start + chrono::Duration::days(i as i64), start_price + i as f64)
            .unwrap();
    }
    series
}

pub const QUOTE_HEADER: &str = "timestamp,open,high,low,close,volume\n";

/// Quote CSV text in the daily export layout, newest row first.
pub fn quote_csv(rows: &[(&str, f64)]) -> String {
    let mut out = String::from(QUOTE_HEADER);
    for &(d, close) in rows.iter().rev() {
        out.push_str(&format!("{d},{o},{h},{l},{close},1000\n", o = close, h = close + 1.0, l = close - 1.0));
    }
    out
}
