//! Monthly top-N rotation simulator.
//!
//! Walks the rebalance calendar once, in order. Each date either produces a
//! rebalance (value compounded, basket replaced) or is skipped with a
//! [`SkipReason`]; a skip never touches the portfolio state.

use chrono::NaiveDate;

use super::momentum::MomentumSeries;
use super::portfolio::PortfolioState;
use super::price_table::PriceTable;
use super::rebalance::month_start;

/// Why a rebalance date produced no transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Asked for a basket of zero assets.
    EmptySelection,
    NoMomentum,
    InsufficientCandidates { defined: usize, required: usize },
    NoValidReturns,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRebalance {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub state: PortfolioState,
    pub skipped: Vec<SkippedRebalance>,
}

/// Ranks defined scores descending and keeps the top `n` asset indices.
/// Ties keep column order. All-or-nothing: fewer than `n` candidates is a
/// skip, and so is `n == 0`.
pub fn select_top_n(defined: &[(usize, f64)], n: usize) -> Result<Vec<usize>, SkipReason> {
    if n == 0 {
        return Err(SkipReason::EmptySelection);
    }
    if defined.is_empty() {
        return Err(SkipReason::NoMomentum);
    }
    if defined.len() < n {
        return Err(SkipReason::InsufficientCandidates {
            defined: defined.len(),
            required: n,
        });
    }
    let mut ranked = defined.to_vec();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranked.into_iter().take(n).map(|(i, _)| i).collect())
}

/// Equal-weighted daily returns of `selected` over `[month_start(date), date]`.
///
/// Only days on which every selected asset has a finite return survive.
pub fn holding_window_returns(table: &PriceTable, selected: &[usize], date: NaiveDate) -> Vec<f64> {
    let rows = table.rows_between(month_start(date), date);
    let per_asset: Vec<Vec<Option<f64>>> = selected
        .iter()
        .map(|&asset_idx| table.window_returns(asset_idx, rows.clone()))
        .collect();

    (0..rows.len())
        .filter_map(|day| {
            let mut sum = 0.0;
            for returns in &per_asset {
                sum += returns[day]?;
            }
            Some(sum / selected.len() as f64)
        })
        .collect()
}

/// Π(1 + r) − 1
pub fn compound(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// One state-machine transition. On `Err` the state is left untouched.
pub fn step(
    state: &mut PortfolioState,
    table: &PriceTable,
    momentum: &MomentumSeries,
    date: NaiveDate,
    top_n: usize,
) -> Result<(), SkipReason> {
    let defined = momentum.defined_at(date);
    let selected = select_top_n(&defined, top_n)?;

    let daily = holding_window_returns(table, &selected, date);
    if daily.is_empty() {
        return Err(SkipReason::NoValidReturns);
    }
    let period_return = compound(&daily);

    let names = selected
        .iter()
        .map(|&i| momentum.assets()[i].clone())
        .collect();
    state.apply_rebalance(date, names, period_return);
    Ok(())
}

pub fn simulate(
    table: &PriceTable,
    momentum: &MomentumSeries,
    rebalance_dates: &[NaiveDate],
    top_n: usize,
    initial_capital: f64,
) -> SimulationResult {
    let mut state = PortfolioState::new(initial_capital);
    let mut skipped = Vec::new();

    for &date in rebalance_dates {
        match step(&mut state, table, momentum, date, top_n) {
            Ok(()) => {
                tracing::debug!(
                    %date,
                    value = state.value,
                    held = ?state.held_assets,
                    "rebalanced"
                );
            }
            Err(reason) => {
                tracing::debug!(%date, ?reason, "rebalance skipped");
                skipped.push(SkippedRebalance { date, reason });
            }
        }
    }

    SimulationResult { state, skipped }
}
