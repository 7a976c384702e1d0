//! Dated, forward-filled price table shared by every stage of the engine.
//!
//! Prices are stored column-wise (one `Vec<Option<f64>>` per asset, aligned
//! to the date index). `None` only ever appears before an asset's first
//! observation: later gaps are forward-filled at construction.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::ops::Range;

use super::error::PriceTableError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Validates and forward-fills a table.
    ///
    /// Fails on empty input, duplicate assets, non-increasing dates,
    /// misaligned columns, and negative or non-finite prices. A zero price
    /// is accepted; ratios against it are treated as undefined downstream.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, PriceTableError> {
        if dates.is_empty() {
            return Err(PriceTableError::NoDates);
        }
        if columns.is_empty() {
            return Err(PriceTableError::NoAssets);
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PriceTableError::UnorderedDates { date: w[1] });
        }

        let mut seen = HashSet::new();
        let mut assets = Vec::with_capacity(columns.len());
        let mut filled = Vec::with_capacity(columns.len());

        for (asset, mut column) in columns {
            if !seen.insert(asset.clone()) {
                return Err(PriceTableError::DuplicateAsset(asset));
            }
            if column.len() != dates.len() {
                return Err(PriceTableError::ColumnLength {
                    asset,
                    len: column.len(),
                    expected: dates.len(),
                });
            }
            for (date, price) in dates.iter().zip(&column) {
                if let Some(p) = *price {
                    if !p.is_finite() || p < 0.0 {
                        return Err(PriceTableError::InvalidPrice {
                            asset,
                            date: *date,
                            price: p,
                        });
                    }
                }
            }
            forward_fill(&mut column);
            assets.push(asset);
            filled.push(column);
        }

        Ok(Self {
            dates,
            assets,
            columns: filled,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn asset_index(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Row index of an exact trading date.
    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Row index of the most recent trading date on or before `date`.
    pub fn index_at_or_before(&self, date: NaiveDate) -> Option<usize> {
        match self.dates.binary_search(&date) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }

    /// Half-open row range covering trading dates in `[start, end]`.
    pub fn rows_between(&self, start: NaiveDate, end: NaiveDate) -> Range<usize> {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end);
        lo..hi.max(lo)
    }

    pub fn column(&self, asset_idx: usize) -> &[Option<f64>] {
        &self.columns[asset_idx]
    }

    pub fn price_at(&self, asset_idx: usize, row: usize) -> Option<f64> {
        self.columns[asset_idx].get(row).copied().flatten()
    }

    pub fn price(&self, asset: &str, date: NaiveDate) -> Option<f64> {
        let asset_idx = self.asset_index(asset)?;
        let row = self.date_index(date)?;
        self.price_at(asset_idx, row)
    }

    /// First row at which the asset has a price.
    pub fn first_valid_index(&self, asset_idx: usize) -> Option<usize> {
        self.columns[asset_idx].iter().position(Option::is_some)
    }

    /// Simple day-over-day returns restricted to `rows`.
    ///
    /// The first row of the range has no predecessor inside the range and is
    /// always `None`, as is any row whose return is not finite.
    pub fn window_returns(&self, asset_idx: usize, rows: Range<usize>) -> Vec<Option<f64>> {
        let column = &self.columns[asset_idx];
        rows.clone()
            .map(|row| {
                if row == rows.start {
                    return None;
                }
                let prev = column[row - 1]?;
                let curr = column[row]?;
                let ret = curr / prev - 1.0;
                ret.is_finite().then_some(ret)
            })
            .collect()
    }
}

/// Carries the last observed price forward over gaps. Leading gaps stay
/// empty.
pub fn forward_fill(column: &mut [Option<f64>]) {
    let mut last = None;
    for slot in column.iter_mut() {
        match *slot {
            Some(p) => last = Some(p),
            None => *slot = last,
        }
    }
}
