//! 13612W momentum score.
//!
//! MOM[i] = 12(p0/p1 - 1) + 4(p0/p3 - 1) + 2(p0/p6 - 1) + (p0/p12 - 1)
//!
//! Over the 252-observation window ending at row i, p0 is the last element
//! and p1/p3/p6/p12 sit 21/63/126/252 elements from the end, i.e.
//! p_k = price[i + 1 - lookback_k]. Fewer than 252 observations: undefined.

use chrono::NaiveDate;

use super::price_table::PriceTable;

/// Trailing observations needed before a score is defined.
pub const MOMENTUM_WINDOW: usize = 252;

/// (lookback, weight) pairs for the 1, 3, 6 and 12 month legs.
const LEGS: [(usize, f64); 4] = [(21, 12.0), (63, 4.0), (126, 2.0), (252, 1.0)];

/// Score for one asset at one row, or `None` if history is short or a
/// ratio is not finite.
pub fn score_at(table: &PriceTable, asset_idx: usize, row: usize) -> Option<f64> {
    if row + 1 < MOMENTUM_WINDOW {
        return None;
    }
    let first = table.first_valid_index(asset_idx)?;
    if row + 1 - first < MOMENTUM_WINDOW {
        return None;
    }

    let p0 = table.price_at(asset_idx, row)?;
    let mut score = 0.0;
    for (lookback, weight) in LEGS {
        let past = table.price_at(asset_idx, row + 1 - lookback)?;
        score += weight * (p0 / past - 1.0);
    }

    score.is_finite().then_some(score)
}

/// Score for `asset` as of `date`, using the most recent row on or before
/// it.
pub fn score(table: &PriceTable, asset: &str, date: NaiveDate) -> Option<f64> {
    let asset_idx = table.asset_index(asset)?;
    let row = table.index_at_or_before(date)?;
    score_at(table, asset_idx, row)
}

/// Scores for every asset on every date of the table.
pub fn compute_series(table: &PriceTable) -> MomentumSeries {
    let asset_count = table.assets().len();
    let rows: Vec<Vec<Option<f64>>> = (0..table.len())
        .map(|row| {
            (0..asset_count)
                .map(|asset_idx| score_at(table, asset_idx, row))
                .collect()
        })
        .collect();

    MomentumSeries {
        dates: table.dates().to_vec(),
        assets: table.assets().to_vec(),
        rows,
    }
}

/// Date-by-asset momentum scores, row-major and aligned with the
/// originating price table.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentumSeries {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl MomentumSeries {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn row(&self, date: NaiveDate) -> Option<&[Option<f64>]> {
        let i = self.dates.binary_search(&date).ok()?;
        Some(&self.rows[i])
    }

    pub fn score(&self, asset: &str, date: NaiveDate) -> Option<f64> {
        let asset_idx = self.assets.iter().position(|a| a == asset)?;
        self.row(date)?[asset_idx]
    }

    /// Defined scores at `date` as `(asset index, score)`, in column order.
    pub fn defined_at(&self, date: NaiveDate) -> Vec<(usize, f64)> {
        self.row(date).map(defined).unwrap_or_default()
    }

    /// First date with at least one defined score.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.rows
            .iter()
            .position(|row| row.iter().any(Option::is_some))
            .map(|i| self.dates[i])
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// First date at which every asset has a defined score.
    pub fn first_complete_row(&self) -> Option<(NaiveDate, Vec<(usize, f64)>)> {
        let i = self
            .rows
            .iter()
            .position(|row| !row.is_empty() && row.iter().all(Option::is_some))?;
        Some((self.dates[i], defined(&self.rows[i])))
    }
}

fn defined(row: &[Option<f64>]) -> Vec<(usize, f64)> {
    row.iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|v| (i, v)))
        .collect()
}
