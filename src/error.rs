use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValorizationError {
    #[error("Unsupported semantic type: '{0}'")]
    UnsupportedType(String),

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid period '{0}': expected YYYY-MM")]
    InvalidPeriod(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid bonus threshold {0}: must be non-negative")]
    InvalidThreshold(i64),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ValorizationError>;
