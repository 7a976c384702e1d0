//! CSV directory price adapter.
//!
//! One file per symbol, `<SYMBOL>.csv`, with a header row. The first column
//! is the date (`%Y-%m-%d`); prices come from `adj_close` when present,
//! otherwise `close`. Empty price cells are missing observations.

use crate::domain::error::MomtraderError;
use crate::domain::price_table::PriceTable;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::PathBuf;

const PRICE_COLUMNS: [&str; 3] = ["adj_close", "adj close", "close"];

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

type Observations = Vec<(NaiveDate, Option<f64>)>;

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// All observations in the symbol's file, sorted by date. `Ok(None)`
    /// when the file does not exist.
    fn read_series(&self, symbol: &str) -> Result<Option<Observations>, MomtraderError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| MomtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| MomtraderError::Data {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        let price_col = PRICE_COLUMNS
            .iter()
            .find_map(|name| {
                headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| MomtraderError::Data {
                reason: format!("{}: no adj_close or close column", path.display()),
            })?;

        let mut observations = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| MomtraderError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| MomtraderError::Data {
                reason: format!("{}: missing date column", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                MomtraderError::Data {
                    reason: format!("{}: invalid date {:?}: {}", path.display(), date_str, e),
                }
            })?;

            let cell = record.get(price_col).unwrap_or("").trim();
            let price = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().map_err(|e| MomtraderError::Data {
                    reason: format!("{}: invalid price {:?} on {}: {}", path.display(), cell, date, e),
                })?)
            };
            observations.push((date, price));
        }

        observations.sort_by_key(|(date, _)| *date);
        if let Some(w) = observations.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(MomtraderError::Data {
                reason: format!("{}: duplicate date {}", path.display(), w[0].0),
            });
        }

        Ok(Some(observations))
    }
}

impl PriceDataPort for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, MomtraderError> {
        let mut series = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let observations = self
                .read_series(symbol)?
                .ok_or_else(|| MomtraderError::NoData {
                    symbol: symbol.clone(),
                })?;
            let in_range: HashMap<NaiveDate, Option<f64>> = observations
                .into_iter()
                .filter(|(date, _)| *date >= start_date && *date <= end_date)
                .collect();
            series.push((symbol.clone(), in_range));
        }

        let timeline: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, obs)| obs.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns: Vec<(String, Vec<Option<f64>>)> = series
            .into_iter()
            .map(|(symbol, obs)| {
                let column = timeline
                    .iter()
                    .map(|date| obs.get(date).copied().flatten())
                    .collect();
                (symbol, column)
            })
            .collect();

        Ok(PriceTable::new(timeline, columns)?)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MomtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MomtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MomtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            if let Some(symbol) = name.to_string_lossy().strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MomtraderError> {
        let Some(observations) = self.read_series(symbol)? else {
            return Ok(None);
        };
        let priced: Vec<NaiveDate> = observations
            .iter()
            .filter(|(_, price)| price.is_some())
            .map(|(date, _)| *date)
            .collect();
        match (priced.first(), priced.last()) {
            (Some(first), Some(last)) => Ok(Some((*first, *last, priced.len()))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::PriceTableError;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("AAA.csv"),
            "date,open,high,low,close,adj_close,volume\n\
             2024-01-03,1,1,1,101.0,100.5,10\n\
             2024-01-02,1,1,1,100.0,99.5,10\n\
             2024-01-05,1,1,1,103.0,,10\n",
        )
        .unwrap();
        fs::write(
            path.join("BBB.csv"),
            "Date,Close\n2024-01-04,50.0\n2024-01-05,51.0\n",
        )
        .unwrap();
        fs::write(path.join("EMPTY.csv"), "date,close\n2024-01-02,\n").unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fetch_prices_outer_joins_and_fills() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter
            .fetch_prices(&symbols(&["AAA", "BBB"]), d(2024, 1, 1), d(2024, 1, 31))
            .unwrap();

        assert_eq!(
            table.dates(),
            &[d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4), d(2024, 1, 5)]
        );
        assert_eq!(table.assets(), &["AAA".to_string(), "BBB".to_string()]);
        assert_eq!(
            table.column(0),
            &[Some(99.5), Some(100.5), Some(100.5), Some(100.5)]
        );
        assert_eq!(table.column(1), &[None, None, Some(50.0), Some(51.0)]);
    }

    #[test]
    fn fetch_prices_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let table = adapter
            .fetch_prices(&symbols(&["AAA"]), d(2024, 1, 3), d(2024, 1, 3))
            .unwrap();
        assert_eq!(table.dates(), &[d(2024, 1, 3)]);
    }

    #[test]
    fn fetch_prices_empty_range_is_invalid_table() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let err = adapter
            .fetch_prices(&symbols(&["AAA"]), d(2025, 1, 1), d(2025, 2, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            MomtraderError::InvalidPriceTable(PriceTableError::NoDates)
        ));
    }

    #[test]
    fn fetch_prices_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let err = adapter
            .fetch_prices(&symbols(&["XYZ"]), d(2024, 1, 1), d(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, MomtraderError::NoData { symbol } if symbol == "XYZ"));
    }

    #[test]
    fn fetch_prices_rejects_bad_price() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("BAD.csv"), "date,close\n2024-01-02,abc\n").unwrap();
        let adapter = CsvPriceAdapter::new(path);

        let err = adapter
            .fetch_prices(&symbols(&["BAD"]), d(2024, 1, 1), d(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(err, MomtraderError::Data { .. }));
    }

    #[test]
    fn fetch_prices_rejects_duplicate_dates() {
        let (_dir, path) = setup_test_data();
        fs::write(
            path.join("DUP.csv"),
            "date,close\n2024-01-02,1.0\n2024-01-02,2.0\n",
        )
        .unwrap();
        let adapter = CsvPriceAdapter::new(path);

        let err = adapter
            .fetch_prices(&symbols(&["DUP"]), d(2024, 1, 1), d(2024, 1, 31))
            .unwrap_err();
        assert!(err.to_string().contains("duplicate date 2024-01-02"));
    }

    #[test]
    fn fetch_prices_rejects_negative_price() {
        let (_dir, path) = setup_test_data();
        fs::write(path.join("NEG.csv"), "date,close\n2024-01-02,-3.0\n").unwrap();
        let adapter = CsvPriceAdapter::new(path);

        let err = adapter
            .fetch_prices(&symbols(&["NEG"]), d(2024, 1, 1), d(2024, 1, 31))
            .unwrap_err();
        assert!(matches!(
            err,
            MomtraderError::InvalidPriceTable(PriceTableError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn list_symbols_reads_csv_files() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        assert_eq!(adapter.list_symbols().unwrap(), vec!["AAA", "BBB", "EMPTY"]);
    }

    #[test]
    fn data_range_counts_priced_rows() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        assert_eq!(
            adapter.get_data_range("AAA").unwrap(),
            Some((d(2024, 1, 2), d(2024, 1, 3), 2))
        );
        assert_eq!(adapter.get_data_range("EMPTY").unwrap(), None);
        assert_eq!(adapter.get_data_range("XYZ").unwrap(), None);
    }
}
