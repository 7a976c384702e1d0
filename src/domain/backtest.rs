//! Backtest configuration and the momentum → schedule → simulate pipeline.

use chrono::NaiveDate;

use super::error::MomtraderError;
use super::momentum::{compute_series, MomentumSeries};
use super::price_table::PriceTable;
use super::rebalance::schedule_dates;
use super::simulator::{simulate, SimulationResult};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_TOP_N: usize = 3;
pub const MAX_TOP_N: usize = 10;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub top_n: usize,
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), MomtraderError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(MomtraderError::ConfigInvalid {
                section: "backtest".into(),
                key: "initial_capital".into(),
                reason: "initial_capital must be positive".into(),
            });
        }
        if !(1..=MAX_TOP_N).contains(&self.top_n) {
            return Err(MomtraderError::ConfigInvalid {
                section: "backtest".into(),
                key: "top_n".into(),
                reason: format!("top_n must be between 1 and {MAX_TOP_N}"),
            });
        }
        if self.start_date >= self.end_date {
            return Err(MomtraderError::ConfigInvalid {
                section: "backtest".into(),
                key: "start_date".into(),
                reason: "start_date must be before end_date".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub momentum: MomentumSeries,
    pub rebalance_dates: Vec<NaiveDate>,
    pub simulation: SimulationResult,
}

pub fn run_backtest(
    table: &PriceTable,
    config: &BacktestConfig,
) -> Result<BacktestResult, MomtraderError> {
    config.validate()?;

    let momentum = compute_series(table);
    match momentum.start_date() {
        Some(start) => tracing::info!(%start, "momentum available"),
        None => tracing::warn!(
            dates = table.len(),
            "no asset has enough history for a momentum score"
        ),
    }

    let rebalance_dates = schedule_dates(table, &momentum);
    tracing::info!(count = rebalance_dates.len(), "rebalance dates scheduled");

    let simulation = simulate(
        table,
        &momentum,
        &rebalance_dates,
        config.top_n,
        config.initial_capital,
    );
    tracing::info!(
        rebalances = simulation.state.history.len(),
        skipped = simulation.skipped.len(),
        final_value = simulation.state.value,
        "simulation complete"
    );

    Ok(BacktestResult {
        momentum,
        rebalance_dates,
        simulation,
    })
}
