//! Month-end rebalance calendar.

use chrono::{Datelike, NaiveDate};

use super::momentum::MomentumSeries;
use super::price_table::PriceTable;

/// First calendar day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last trading date of each calendar month present in the table.
pub fn month_end_dates(table: &PriceTable) -> Vec<NaiveDate> {
    let dates = table.dates();
    dates
        .iter()
        .enumerate()
        .filter(|&(i, d)| match dates.get(i + 1) {
            Some(next) => (next.year(), next.month()) != (d.year(), d.month()),
            None => true,
        })
        .map(|(_, d)| *d)
        .collect()
}

/// Month ends on or after `momentum_start`. Without a start date nothing is
/// schedulable.
pub fn schedule_from(month_ends: &[NaiveDate], momentum_start: Option<NaiveDate>) -> Vec<NaiveDate> {
    match momentum_start {
        Some(start) => month_ends.iter().copied().filter(|d| *d >= start).collect(),
        None => Vec::new(),
    }
}

pub fn schedule_dates(table: &PriceTable, momentum: &MomentumSeries) -> Vec<NaiveDate> {
    schedule_from(&month_end_dates(table), momentum.start_date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::momentum::compute_series;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table(dates: Vec<NaiveDate>) -> PriceTable {
        let column = vec![Some(100.0); dates.len()];
        PriceTable::new(dates, vec![("AAA".into(), column)]).unwrap()
    }

    #[test]
    fn month_start_is_first_day() {
        assert_eq!(month_start(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(month_start(d(2024, 3, 1)), d(2024, 3, 1));
    }

    #[test]
    fn month_ends_pick_last_trading_day() {
        let t = table(vec![
            d(2024, 1, 30),
            d(2024, 1, 31),
            d(2024, 2, 1),
            d(2024, 2, 28),
            d(2024, 3, 28),
            d(2024, 4, 1),
        ]);
        assert_eq!(
            month_end_dates(&t),
            vec![d(2024, 1, 31), d(2024, 2, 28), d(2024, 3, 28), d(2024, 4, 1)]
        );
    }

    #[test]
    fn month_ends_distinguish_years() {
        let t = table(vec![d(2023, 1, 15), d(2024, 1, 10)]);
        assert_eq!(month_end_dates(&t), vec![d(2023, 1, 15), d(2024, 1, 10)]);
    }

    #[test]
    fn schedule_keeps_start_month_end() {
        let ends = vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 29)];
        assert_eq!(
            schedule_from(&ends, Some(d(2024, 2, 29))),
            vec![d(2024, 2, 29), d(2024, 3, 29)]
        );
        assert_eq!(
            schedule_from(&ends, Some(d(2024, 2, 10))),
            vec![d(2024, 2, 29), d(2024, 3, 29)]
        );
    }

    #[test]
    fn schedule_empty_without_start() {
        let ends = vec![d(2024, 1, 31)];
        assert!(schedule_from(&ends, None).is_empty());
    }

    #[test]
    fn schedule_dates_short_history_is_empty() {
        let t = table((0..100).map(|i| d(2024, 1, 1) + chrono::Duration::days(i)).collect());
        let momentum = compute_series(&t);
        assert!(schedule_dates(&t, &momentum).is_empty());
    }
}
