use thiserror::Error;

/// Errors raised synchronously by the calendar and slot builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ScheduleError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ScheduleError::InvalidConfiguration(message.into())
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
