use super::{PersistenceError, PersistenceResult, SessionSnapshot};
use crate::calendar::CalendarConfig;
use crate::session::{SessionRecord, SessionStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &SessionSnapshot,
    path: P,
) -> PersistenceResult<()> {
    super::validate_sessions(&snapshot.sessions)?;
    if let Some(config) = &snapshot.config {
        super::validate_config(config)?;
    }
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, snapshot)?;
    info!(
        path = %path.as_ref().display(),
        sessions = snapshot.sessions.len(),
        "saved session snapshot"
    );
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SessionSnapshot> {
    let file = File::open(path.as_ref())?;
    let snapshot: SessionSnapshot = serde_json::from_reader(file)?;
    super::validate_loaded_sessions(&snapshot.sessions)?;
    if let Some(config) = &snapshot.config {
        super::validate_config(config)?;
    }
    info!(
        path = %path.as_ref().display(),
        sessions = snapshot.sessions.len(),
        "loaded session snapshot"
    );
    Ok(snapshot)
}

pub fn save_config_to_json<P: AsRef<Path>>(config: &CalendarConfig, path: P) -> PersistenceResult<()> {
    super::validate_config(config)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<CalendarConfig> {
    let file = File::open(path)?;
    let config: CalendarConfig = serde_json::from_reader(file)?;
    super::validate_config(&config)?;
    Ok(config)
}

#[derive(Default, Serialize, Deserialize)]
struct SessionCsvRecord {
    id: i32,
    child_id: i32,
    subject_id: i32,
    teacher_id: i32,
    start_time: String,
    end_time: String,
    status: String,
    #[serde(default)]
    attended: String,
    #[serde(default)]
    performance_score: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    child_name: String,
    #[serde(default)]
    teacher_name: String,
    #[serde(default)]
    subject_name: String,
}

impl From<&SessionRecord> for SessionCsvRecord {
    fn from(session: &SessionRecord) -> Self {
        SessionCsvRecord {
            id: session.id,
            child_id: session.child_id,
            subject_id: session.subject_id,
            teacher_id: session.teacher_id,
            start_time: format_timestamp(session.start_time),
            end_time: format_timestamp(session.end_time),
            status: session.status.as_str().to_string(),
            attended: session.attended.map(|v| v.to_string()).unwrap_or_default(),
            performance_score: session
                .performance_score
                .map(|v| v.to_string())
                .unwrap_or_default(),
            location: session.location.clone().unwrap_or_default(),
            notes: session.notes.clone().unwrap_or_default(),
            child_name: session.child_name.clone().unwrap_or_default(),
            teacher_name: session.teacher_name.clone().unwrap_or_default(),
            subject_name: session.subject_name.clone().unwrap_or_default(),
        }
    }
}

impl SessionCsvRecord {
    fn into_session(self) -> PersistenceResult<SessionRecord> {
        let status = if self.status.trim().is_empty() {
            SessionStatus::default()
        } else {
            self.status
                .parse::<SessionStatus>()
                .map_err(PersistenceError::InvalidData)?
        };
        Ok(SessionRecord {
            id: self.id,
            child_id: self.child_id,
            subject_id: self.subject_id,
            teacher_id: self.teacher_id,
            start_time: lenient_timestamp(self.id, "start_time", &self.start_time),
            end_time: lenient_timestamp(self.id, "end_time", &self.end_time),
            status,
            attended: parse_bool(&self.attended)?,
            performance_score: parse_f64(&self.performance_score)?,
            location: parse_string_option(self.location),
            notes: parse_string_option(self.notes),
            child_name: parse_string_option(self.child_name),
            teacher_name: parse_string_option(self.teacher_name),
            subject_name: parse_string_option(self.subject_name),
        })
    }
}

pub fn save_sessions_to_csv<P: AsRef<Path>>(
    sessions: &[SessionRecord],
    path: P,
) -> PersistenceResult<()> {
    super::validate_sessions(sessions)?;
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    for session in sessions {
        writer.serialize(SessionCsvRecord::from(session))?;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), sessions = sessions.len(), "saved sessions csv");
    Ok(())
}

/// Rows with unreadable timestamps load with the timestamp missing; the
/// projector reports them instead of the whole import failing.
pub fn load_sessions_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<SessionRecord>> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);
    let mut sessions = Vec::new();
    for record in reader.deserialize::<SessionCsvRecord>() {
        sessions.push(record?.into_session()?);
    }
    super::validate_loaded_sessions(&sessions)?;
    info!(path = %path.as_ref().display(), sessions = sessions.len(), "loaded sessions csv");
    Ok(sessions)
}

pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

fn lenient_timestamp(id: i32, field: &str, input: &str) -> Option<NaiveDateTime> {
    if input.trim().is_empty() {
        return None;
    }
    let parsed = parse_timestamp(input);
    if parsed.is_none() {
        warn!(session_id = id, field, value = input, "unreadable timestamp");
    }
    parsed
}

fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid number '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<Option<bool>> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}

fn parse_string_option(input: String) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}
