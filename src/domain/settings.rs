//! Application settings read and validated from a [`ConfigPort`].

use crate::domain::error::StockfolioError;
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_MOVING_AVERAGE_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub quotes_dir: PathBuf,
    pub portfolio_dir: PathBuf,
    pub moving_average_days: usize,
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockfolioError> {
        Ok(Settings {
            quotes_dir: required_path(config, "quotes", "data_dir")?,
            portfolio_dir: required_path(config, "portfolios", "dir")?,
            moving_average_days: moving_average_days(config)?,
        })
    }
}

fn required_path(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<PathBuf, StockfolioError> {
    config
        .get_path(section, key)
        .ok_or_else(|| StockfolioError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn moving_average_days(config: &dyn ConfigPort) -> Result<usize, StockfolioError> {
    let invalid = |reason: String| StockfolioError::ConfigInvalid {
        section: "analysis".to_string(),
        key: "moving_average_days".to_string(),
        reason,
    };
    match config.get_int("analysis", "moving_average_days") {
        Ok(None) => Ok(DEFAULT_MOVING_AVERAGE_DAYS),
        Ok(Some(days)) if days > 0 => Ok(days as usize),
        Ok(Some(days)) => Err(invalid(format!("must be positive, got {days}"))),
        Err(e) => Err(invalid(e)),
    }
}
