use thiserror::Error;

use crate::expression::ExpressionError;

/// Errors that can occur within the schedule engine.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A visual schedule whose authoritative fields break an invariant.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Hour, minute or period outside what the time picker offers.
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Unknown timezone: {0}")]
    UnknownZone(String),

    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),

    #[error("Unknown interval unit: {0}")]
    UnknownIntervalUnit(String),

    /// The raw schedule expression failed to parse.
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// No job with the given name exists in the registry.
    #[error("Job not found: {name}")]
    JobNotFound { name: String },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
