//! Portfolio state and value tracking.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One successful rebalance: the basket chosen at `date` and the holding
/// period return it earned.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceRecord {
    pub date: NaiveDate,
    pub selected: Vec<String>,
    pub period_return: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub initial_capital: f64,
    pub value: f64,
    pub history: Vec<ValuePoint>,
    pub held_assets: Option<Vec<String>>,
    pub rebalances: Vec<RebalanceRecord>,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        PortfolioState {
            initial_capital,
            value: initial_capital,
            history: Vec::new(),
            held_assets: None,
            rebalances: Vec::new(),
        }
    }

    /// Compounds `period_return` into the value and records the new basket.
    pub fn apply_rebalance(&mut self, date: NaiveDate, selected: Vec<String>, period_return: f64) {
        self.value *= 1.0 + period_return;
        self.history.push(ValuePoint {
            date,
            value: self.value,
        });
        self.rebalances.push(RebalanceRecord {
            date,
            selected: selected.clone(),
            period_return,
            value: self.value,
        });
        self.held_assets = Some(selected);
    }

    pub fn rebalance_count(&self) -> usize {
        self.history.len()
    }

    pub fn total_return(&self) -> f64 {
        if self.initial_capital > 0.0 {
            self.value / self.initial_capital - 1.0
        } else {
            0.0
        }
    }
}
