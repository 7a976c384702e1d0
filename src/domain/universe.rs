//! Symbol universe: parsing the configured list and dropping symbols the
//! data source cannot serve.

use crate::domain::error::MomtraderError;
use crate::ports::data_port::PriceDataPort;
use std::collections::HashSet;

/// Default universe: long/short currency ETF pairs on EUR, JPY and GBP.
pub const DEFAULT_SYMBOLS: &[&str] = &["USEU.MI", "EUUS.MI", "LJPY.L", "SJPY.L", "GBUS.L", "USGB.L"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    NoData,
    SourceError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedSymbol {
    pub symbol: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone)]
pub struct UniverseValidationResult {
    pub symbols: Vec<String>,
    pub excluded: Vec<ExcludedSymbol>,
}

/// Keeps the symbols for which the data source reports at least one price.
/// Short histories are kept: they simply score as undefined until enough
/// observations accumulate.
pub fn validate_universe(
    data_port: &dyn PriceDataPort,
    symbols: Vec<String>,
) -> Result<UniverseValidationResult, MomtraderError> {
    let mut valid = Vec::new();
    let mut excluded = Vec::new();

    for symbol in symbols {
        match data_port.get_data_range(&symbol) {
            Ok(Some((first, last, count))) => {
                tracing::info!(%symbol, count, %first, %last, "symbol ok");
                valid.push(symbol);
            }
            Ok(None) => {
                tracing::warn!(%symbol, "skipping symbol: no data found");
                excluded.push(ExcludedSymbol {
                    symbol,
                    reason: ExclusionReason::NoData,
                });
            }
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "skipping symbol");
                excluded.push(ExcludedSymbol {
                    symbol,
                    reason: ExclusionReason::SourceError(e.to_string()),
                });
            }
        }
    }

    if valid.is_empty() {
        return Err(MomtraderError::NoData {
            symbol: "all".to_string(),
        });
    }

    if !excluded.is_empty() {
        tracing::warn!(
            kept = valid.len(),
            total = valid.len() + excluded.len(),
            "backtesting a reduced universe"
        );
    }

    Ok(UniverseValidationResult {
        symbols: valid,
        excluded,
    })
}
