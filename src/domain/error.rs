//! Domain error types.

use chrono::NaiveDate;

/// Structural faults in a price table. These are never swallowed: a table
/// that fails here cannot produce a meaningful backtest.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriceTableError {
    #[error("price table has no dates")]
    NoDates,

    #[error("price table has no assets")]
    NoAssets,

    #[error("duplicate asset: {0}")]
    DuplicateAsset(String),

    #[error("dates not strictly increasing at {date}")]
    UnorderedDates { date: NaiveDate },

    #[error("column {asset} has {len} values, expected {expected}")]
    ColumnLength {
        asset: String,
        len: usize,
        expected: usize,
    },

    #[error("invalid price {price} for {asset} on {date}")]
    InvalidPrice {
        asset: String,
        date: NaiveDate,
        price: f64,
    },
}

/// Top-level error type for momtrader.
#[derive(Debug, thiserror::Error)]
pub enum MomtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    InvalidPriceTable(#[from] PriceTableError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MomtraderError> for std::process::ExitCode {
    fn from(err: &MomtraderError) -> Self {
        let code: u8 = match err {
            MomtraderError::Io(_) => 1,
            MomtraderError::ConfigParse { .. }
            | MomtraderError::ConfigMissing { .. }
            | MomtraderError::ConfigInvalid { .. } => 2,
            MomtraderError::Data { .. } => 3,
            MomtraderError::NoData { .. } | MomtraderError::InvalidPriceTable(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
