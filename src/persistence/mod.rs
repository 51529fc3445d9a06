use crate::calendar::CalendarConfig;
use crate::session::SessionRecord;
use crate::session_validation::{self, SessionValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<SessionValidationError> for PersistenceError {
    fn from(value: SessionValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Sessions plus the calendar settings they were saved with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<CalendarConfig>,
    pub sessions: Vec<SessionRecord>,
}

impl SessionSnapshot {
    pub fn new(sessions: Vec<SessionRecord>, config: Option<CalendarConfig>) -> Self {
        Self { config, sessions }
    }
}

pub trait SessionStore {
    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> PersistenceResult<()>;
    fn load_snapshot(&self) -> PersistenceResult<Option<SessionSnapshot>>;
}

/// Checks applied before anything is written: every record must be
/// projectable and ids must be unique.
pub fn validate_sessions(sessions: &[SessionRecord]) -> PersistenceResult<()> {
    session_validation::validate_session_collection(sessions)?;
    Ok(())
}

/// Checks applied on load. Incomplete records are kept so the projector can
/// report them; duplicate ids are not.
pub fn validate_loaded_sessions(sessions: &[SessionRecord]) -> PersistenceResult<()> {
    session_validation::ensure_unique_ids(sessions)?;
    Ok(())
}

pub fn validate_config(config: &CalendarConfig) -> PersistenceResult<()> {
    config
        .validate()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_config_from_json, load_sessions_from_csv, load_snapshot_from_json, save_config_to_json,
    save_sessions_to_csv, save_snapshot_to_json,
};
