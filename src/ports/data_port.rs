//! Price data access port.

use crate::domain::error::MomtraderError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Prices for `symbols` between `start_date` and `end_date` inclusive,
    /// one column per symbol in the order requested.
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, MomtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, MomtraderError>;

    /// First date, last date and number of observations, or `None` when the
    /// source has nothing for `symbol`.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MomtraderError>;
}
