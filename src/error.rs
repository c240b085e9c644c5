use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised by the calendar and the date resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("unsupported jurisdiction '{0}'")]
    UnsupportedJurisdiction(String),

    #[error("activity #{index} '{name}' has invalid duration {duration} (must be at least 1 working day)")]
    InvalidDuration {
        index: usize,
        name: String,
        duration: i64,
    },

    #[error("weather delay period must be positive (got {0})")]
    InvalidWeatherPeriod(u32),

    #[error("schedule cursor left the supported date range after {0}")]
    DateOutOfRange(NaiveDate),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
