//! Rebalance targets.
//!
//! A weight map containing the `ALL` key selects equal weighting across every
//! held symbol; any other map assigns each listed symbol a fraction of the
//! portfolio's value. Weights are taken as given and never renormalised.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::error::StockfolioError;

/// Weight-map key that selects equal weighting. Its value is ignored.
pub const ALL_SENTINEL: &str = "ALL";

#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceTarget {
    /// Every held symbol gets `1 / N` of the total value.
    EqualWeight,
    /// Listed symbols get `weight × total` of the value.
    Weighted(BTreeMap<String, f64>),
}

impl RebalanceTarget {
    /// Interprets a raw weight map, honouring the `ALL` sentinel.
    pub fn from_weights(weights: &HashMap<String, f64>) -> Result<Self, StockfolioError> {
        if weights.contains_key(ALL_SENTINEL) {
            return Ok(RebalanceTarget::EqualWeight);
        }
        let mut target = BTreeMap::new();
        for (symbol, &weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(StockfolioError::invalid_input(format!(
                    "weight for {symbol} must be a non-negative number, got {weight}"
                )));
            }
            target.insert(symbol.clone(), weight);
        }
        Ok(RebalanceTarget::Weighted(target))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightsError {
    #[error("empty token in weight list")]
    EmptyToken,

    #[error("missing weight for {0} (expected SYMBOL=WEIGHT)")]
    MissingWeight(String),

    #[error("invalid weight for {symbol}: {value}")]
    InvalidWeight { symbol: String, value: String },

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("{0:?} is not a symbol; write ALL to select equal weighting")]
    MisspelledAll(String),
}

/// Parses `"AAPL=0.5, GOOG=0.5"` or `"ALL"` into a rebalance target.
///
/// Symbols are upper-cased, but the `ALL` key is matched exactly, as in
/// [`RebalanceTarget::from_weights`].
pub fn parse_weights(input: &str) -> Result<RebalanceTarget, WeightsError> {
    let mut weights = BTreeMap::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(WeightsError::EmptyToken);
        }
        let (raw, value) = match trimmed.split_once('=') {
            Some((raw, value)) => (raw.trim(), Some(value.trim())),
            None => (trimmed, None),
        };
        // `ALL` is matched exactly, as `from_weights` does; its value is ignored
        if raw == ALL_SENTINEL {
            return Ok(RebalanceTarget::EqualWeight);
        }
        let symbol = raw.to_uppercase();
        if symbol == ALL_SENTINEL {
            return Err(WeightsError::MisspelledAll(raw.to_string()));
        }
        let value = value.ok_or_else(|| WeightsError::MissingWeight(symbol.clone()))?;
        if symbol.is_empty() {
            return Err(WeightsError::EmptyToken);
        }
        let weight: f64 = value
            .parse()
            .ok()
            .filter(|w: &f64| w.is_finite() && *w >= 0.0)
            .ok_or_else(|| WeightsError::InvalidWeight {
                symbol: symbol.clone(),
                value: value.to_string(),
            })?;
        if !seen.insert(symbol.clone()) {
            return Err(WeightsError::DuplicateSymbol(symbol));
        }
        weights.insert(symbol, weight);
    }

    Ok(RebalanceTarget::Weighted(weights))
}
