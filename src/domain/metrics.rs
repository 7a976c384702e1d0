//! Performance metrics over the monthly value history.

use super::portfolio::{PortfolioState, ValuePoint};

const REBALANCES_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub rebalances: usize,
    pub skipped_rebalances: usize,
    pub best_period: f64,
    pub worst_period: f64,
}

impl Metrics {
    pub fn compute(state: &PortfolioState, skipped_rebalances: usize) -> Self {
        let total_return = state.total_return();

        let periods = state.history.len() as f64;
        let years = periods / REBALANCES_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) =
            compute_drawdown(state.initial_capital, &state.history);

        let period_returns = state.rebalances.iter().map(|r| r.period_return);
        let best_period = period_returns.clone().reduce(f64::max).unwrap_or(0.0);
        let worst_period = period_returns.reduce(f64::min).unwrap_or(0.0);

        Metrics {
            final_value: state.value,
            total_return,
            annualized_return,
            max_drawdown,
            max_drawdown_duration,
            rebalances: state.history.len(),
            skipped_rebalances,
            best_period,
            worst_period,
        }
    }
}

/// Largest peak-to-trough decline (as a fraction) and the longest run of
/// consecutive points spent below a prior peak. The path starts at
/// `initial_value`.
fn compute_drawdown(initial_value: f64, history: &[ValuePoint]) -> (f64, usize) {
    let mut peak = initial_value;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for point in history {
        if point.value >= peak {
            peak = point.value;
            current_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_duration += 1;
            if current_duration > max_duration {
                max_duration = current_duration;
            }
        }
    }

    (max_dd, max_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn state_with_returns(initial: f64, returns: &[f64]) -> PortfolioState {
        let mut state = PortfolioState::new(initial);
        for (i, &r) in returns.iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, (i % 12) as u32 + 1, 28)
                .unwrap();
            state.apply_rebalance(date, vec!["AAA".into()], r);
        }
        state
    }

    #[test]
    fn empty_history() {
        let state = PortfolioState::new(100.0);
        let m = Metrics::compute(&state, 4);
        assert_eq!(m.final_value, 100.0);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.annualized_return, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.rebalances, 0);
        assert_eq!(m.skipped_rebalances, 4);
    }

    #[test]
    fn twelve_months_annualizes_to_total() {
        let state = state_with_returns(100.0, &[0.01; 12]);
        let m = Metrics::compute(&state, 0);
        assert!((m.annualized_return - m.total_return).abs() < 1e-12);
        assert!((m.total_return - (1.01_f64.powi(12) - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn drawdown_from_initial_capital() {
        // 100 -> 90 -> 99 -> 108
        let state = state_with_returns(100.0, &[-0.1, 0.1, 0.090909090909]);
        let m = Metrics::compute(&state, 0);
        assert!((m.max_drawdown - 0.1).abs() < 1e-9);
        assert_eq!(m.max_drawdown_duration, 2);
        assert!((m.worst_period + 0.1).abs() < 1e-12);
        assert!((m.best_period - 0.1).abs() < 1e-12);
    }
}
