//! Quote source backed by daily time-series CSV exports.
//!
//! Each symbol lives in `<base_path>/<SYMBOL>.csv` with a header row followed
//! by `timestamp,open,high,low,close,volume` records. Only the close is kept.

use crate::domain::error::StockfolioError;
use crate::domain::price_series::PriceSeries;
use crate::ports::quote_port::QuoteSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

const CLOSE_COLUMN: usize = 4;

pub struct CsvQuoteAdapter {
    base_path: PathBuf,
}

impl CsvQuoteAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Symbols with a CSV file in the base directory, sorted.
    pub fn available_symbols(&self) -> Result<Vec<String>, StockfolioError> {
        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    symbols.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

impl QuoteSource for CsvQuoteAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, StockfolioError> {
        let data_error = |reason: String| StockfolioError::DataSource {
            symbol: symbol.to_string(),
            reason,
        };

        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut series = PriceSeries::new(symbol);

        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            if record.len() <= CLOSE_COLUMN {
                tracing::warn!(symbol, fields = record.len(), "skipping short quote row");
                continue;
            }

            let date = NaiveDate::parse_from_str(&record[0], "%Y-%m-%d")
                .map_err(|e| data_error(format!("invalid date {:?}: {}", &record[0], e)))?;
            let close: f64 = record[CLOSE_COLUMN]
                .parse()
                .map_err(|e| data_error(format!("invalid close value on {}: {}", date, e)))?;

            series
                .add_price(date, close)
                .map_err(|e| data_error(e.to_string()))?;
        }

        if series.is_empty() {
            return Err(data_error(format!("no quotes in {}", path.display())));
        }
        tracing::debug!(symbol, prices = series.len(), "loaded quotes");
        Ok(series)
    }
}
