//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::backtest::{DEFAULT_INITIAL_CAPITAL, DEFAULT_TOP_N, MAX_TOP_N};
use crate::domain::error::MomtraderError;
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    validate_initial_capital(config)?;
    validate_top_n(config)?;
    validate_dates(config)?;
    validate_symbols(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    match config.get_string("data", "path") {
        Some(_) => Ok(()),
        None => Err(MomtraderError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

/// Parses `[section] key`, falling back to `default` only when the key is
/// absent. A present but unparseable value is an error.
fn parse_key<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, MomtraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| MomtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("cannot parse {:?}", raw.trim()),
        }),
    }
}

pub fn read_initial_capital(config: &dyn ConfigPort) -> Result<f64, MomtraderError> {
    parse_key(config, "backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL)
}

pub fn read_top_n(config: &dyn ConfigPort) -> Result<usize, MomtraderError> {
    parse_key(config, "backtest", "top_n", DEFAULT_TOP_N)
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let value = read_initial_capital(config)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(MomtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_top_n(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let value = read_top_n(config)?;
    if !(1..=MAX_TOP_N).contains(&value) {
        return Err(MomtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "top_n".to_string(),
            reason: format!("top_n must be between 1 and {}", MAX_TOP_N),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let start_str = config.get_string("backtest", "start_date");
    let start_date = match start_str.as_deref() {
        Some(s) => parse_date(s, "start_date")?,
        None => {
            return Err(MomtraderError::ConfigMissing {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
            });
        }
    };

    if let Some(end_str) = config.get_string("backtest", "end_date") {
        let end_date = parse_date(&end_str, "end_date")?;
        if start_date >= end_date {
            return Err(MomtraderError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must be before end_date".to_string(),
            });
        }
    }
    Ok(())
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, MomtraderError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        MomtraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: field.to_string(),
            reason: format!("invalid {} format, expected YYYY-MM-DD", field),
        }
    })
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let Some(symbols) = config.get_string("backtest", "symbols") else {
        return Ok(());
    };
    parse_symbols(&symbols).map_err(|e| MomtraderError::ConfigInvalid {
        section: "backtest".to_string(),
        key: "symbols".to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
