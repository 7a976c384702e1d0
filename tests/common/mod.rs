#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use momtrader::domain::backtest::BacktestConfig;
use momtrader::domain::error::MomtraderError;
use momtrader::domain::price_table::PriceTable;
use momtrader::ports::data_port::PriceDataPort;
use std::collections::{BTreeSet, HashMap};

pub type Series = Vec<(NaiveDate, f64)>;

pub struct MockPriceDataPort {
    pub data: HashMap<String, Series>,
    pub errors: HashMap<String, String>,
}

impl MockPriceDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: Series) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockPriceDataPort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, MomtraderError> {
        let mut series = Vec::new();
        for symbol in symbols {
            if let Some(reason) = self.errors.get(symbol) {
                return Err(MomtraderError::Data {
                    reason: reason.clone(),
                });
            }
            let obs: HashMap<NaiveDate, f64> = self
                .data
                .get(symbol)
                .ok_or_else(|| MomtraderError::NoData {
                    symbol: symbol.clone(),
                })?
                .iter()
                .filter(|(d, _)| *d >= start_date && *d <= end_date)
                .copied()
                .collect();
            series.push((symbol.clone(), obs));
        }

        let timeline: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, obs)| obs.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns = series
            .into_iter()
            .map(|(symbol, obs)| {
                let column = timeline.iter().map(|d| obs.get(d).copied()).collect();
                (symbol, column)
            })
            .collect();

        Ok(PriceTable::new(timeline, columns)?)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MomtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MomtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MomtraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(series) if !series.is_empty() => {
                let min = series.iter().map(|(d, _)| *d).min().unwrap();
                let max = series.iter().map(|(d, _)| *d).max().unwrap();
                Ok(Some((min, max, series.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `n` consecutive weekdays starting at (or after) `start`.
pub fn trading_days(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut d = start;
    while days.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(d);
        }
        d += Duration::days(1);
    }
    days
}

pub fn flat(days: &[NaiveDate], price: f64) -> Series {
    days.iter().map(|d| (*d, price)).collect()
}

pub fn linear(days: &[NaiveDate], start: f64, step: f64) -> Series {
    days.iter()
        .enumerate()
        .map(|(i, d)| (*d, start + step * i as f64))
        .collect()
}

pub fn geometric(days: &[NaiveDate], start: f64, rate: f64) -> Series {
    days.iter()
        .enumerate()
        .map(|(i, d)| (*d, start * (1.0 + rate).powi(i as i32)))
        .collect()
}

/// Prices from a sequence of daily returns, starting at `start`.
pub fn from_returns(days: &[NaiveDate], start: f64, returns: &[f64]) -> Series {
    let mut price = start;
    days.iter()
        .enumerate()
        .map(|(i, d)| {
            if i > 0 {
                price *= 1.0 + returns[(i - 1) % returns.len()];
            }
            (*d, price)
        })
        .collect()
}

pub fn table_of(series: &[(&str, Series)]) -> PriceTable {
    let dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|(_, s)| s.iter().map(|(d, _)| *d))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns = series
        .iter()
        .map(|(name, s)| {
            let by_date: HashMap<NaiveDate, f64> = s.iter().copied().collect();
            let column = dates.iter().map(|d| by_date.get(d).copied()).collect();
            (name.to_string(), column)
        })
        .collect();
    PriceTable::new(dates, columns).unwrap()
}

pub fn sample_config(top_n: usize) -> BacktestConfig {
    BacktestConfig {
        start_date: date(2019, 1, 1),
        end_date: date(2030, 12, 31),
        initial_capital: 100_000.0,
        top_n,
    }
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
