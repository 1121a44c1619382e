//! Domain error types.

use chrono::NaiveDate;
use std::fmt;

/// What a `NotFound` lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Portfolio,
    Symbol,
    Series,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupKind::Portfolio => "portfolio",
            LookupKind::Symbol => "symbol",
            LookupKind::Series => "price series",
        };
        f.write_str(label)
    }
}

/// Top-level error type for stockfolio.
#[derive(Debug, thiserror::Error)]
pub enum StockfolioError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("no price for {symbol} on {date}")]
    MissingData { symbol: String, date: NaiveDate },

    #[error("{kind} not found: {name}")]
    NotFound { kind: LookupKind, name: String },

    #[error("portfolio already exists: {name}")]
    AlreadyExists { name: String },

    #[error("quote data error for {symbol}: {reason}")]
    DataSource { symbol: String, reason: String },

    #[error("portfolio file error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockfolioError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        StockfolioError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: LookupKind, name: impl Into<String>) -> Self {
        StockfolioError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Fails with `InvalidRange` when `start` is after `end`.
    pub fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), Self> {
        if start > end {
            return Err(StockfolioError::InvalidRange { start, end });
        }
        Ok(())
    }
}

impl From<&StockfolioError> for std::process::ExitCode {
    fn from(err: &StockfolioError) -> Self {
        let code: u8 = match err {
            StockfolioError::Io(_) | StockfolioError::Parse { .. } => 1,
            StockfolioError::ConfigParse { .. }
            | StockfolioError::ConfigMissing { .. }
            | StockfolioError::ConfigInvalid { .. } => 2,
            StockfolioError::InvalidInput { .. } | StockfolioError::InvalidRange { .. } => 3,
            StockfolioError::NotFound { .. } | StockfolioError::AlreadyExists { .. } => 4,
            StockfolioError::MissingData { .. } | StockfolioError::DataSource { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
