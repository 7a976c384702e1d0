//! Summary views over a finished backtest. Pure projections: nothing here
//! re-runs the simulation.

use chrono::NaiveDate;

use super::backtest::BacktestResult;
use super::metrics::Metrics;
use super::momentum::MomentumSeries;
use super::portfolio::ValuePoint;
use super::price_table::PriceTable;
use super::rebalance::month_start;
use super::simulator::compound;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedAsset {
    pub asset: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetMtd {
    pub asset: String,
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitialMomentum {
    pub date: NaiveDate,
    pub ranking: Vec<RankedAsset>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub as_of: NaiveDate,
    pub initial_momentum: Option<InitialMomentum>,
    pub history: Vec<ValuePoint>,
    pub held_assets: Option<Vec<String>>,
    pub latest_ranking: Vec<RankedAsset>,
    pub predicted_next: Vec<RankedAsset>,
    pub asset_mtd: Vec<AssetMtd>,
    pub portfolio_mtd_pct: f64,
    pub metrics: Metrics,
}

fn rank(momentum: &MomentumSeries, defined: &[(usize, f64)]) -> Vec<RankedAsset> {
    let mut ranked: Vec<RankedAsset> = defined
        .iter()
        .map(|&(i, score)| RankedAsset {
            asset: momentum.assets()[i].clone(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Defined scores on the most recent date, best first, truncated to `top_n`.
pub fn latest_ranking(momentum: &MomentumSeries, top_n: usize) -> Vec<RankedAsset> {
    let Some(latest) = momentum.latest_date() else {
        return Vec::new();
    };
    let mut ranked = rank(momentum, &momentum.defined_at(latest));
    ranked.truncate(top_n);
    ranked
}

/// The naive forecast: next period's basket is today's ranking.
pub fn predicted_next(momentum: &MomentumSeries, top_n: usize) -> Vec<RankedAsset> {
    latest_ranking(momentum, top_n)
}

/// The first date on which every asset scores, fully ranked.
pub fn initial_momentum(momentum: &MomentumSeries) -> Option<InitialMomentum> {
    let (date, defined) = momentum.first_complete_row()?;
    Some(InitialMomentum {
        date,
        ranking: rank(momentum, &defined),
    })
}

/// Month-to-date percent return of each asset, from the first day of
/// `as_of`'s month through `as_of`. Assets without rows in that window are
/// omitted.
pub fn asset_mtd_returns(table: &PriceTable, assets: &[String], as_of: NaiveDate) -> Vec<AssetMtd> {
    let rows = table.rows_between(month_start(as_of), as_of);
    if rows.is_empty() {
        return Vec::new();
    }
    assets
        .iter()
        .filter_map(|asset| {
            let asset_idx = table.asset_index(asset)?;
            let daily: Vec<f64> = table
                .window_returns(asset_idx, rows.clone())
                .into_iter()
                .flatten()
                .collect();
            Some(AssetMtd {
                asset: asset.clone(),
                return_pct: compound(&daily) * 100.0,
            })
        })
        .collect()
}

/// Percent change between the last two history entries; zero with fewer
/// than two.
pub fn portfolio_mtd_return(history: &[ValuePoint]) -> f64 {
    match history {
        [.., prev, last] => (last.value / prev.value - 1.0) * 100.0,
        _ => 0.0,
    }
}

pub fn build_report(table: &PriceTable, result: &BacktestResult, top_n: usize) -> BacktestReport {
    let state = &result.simulation.state;
    let as_of = table.last_date();

    let asset_mtd = state
        .held_assets
        .as_deref()
        .map(|held| asset_mtd_returns(table, held, as_of))
        .unwrap_or_default();

    BacktestReport {
        as_of,
        initial_momentum: initial_momentum(&result.momentum),
        history: state.history.clone(),
        held_assets: state.held_assets.clone(),
        latest_ranking: latest_ranking(&result.momentum, top_n),
        predicted_next: predicted_next(&result.momentum, top_n),
        asset_mtd,
        portfolio_mtd_pct: portfolio_mtd_return(&state.history),
        metrics: Metrics::compute(state, result.simulation.skipped.len()),
    }
}
