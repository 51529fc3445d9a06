use crate::session::SessionRecord;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

const MAX_PERFORMANCE_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("session {session_id}: {message}")]
pub struct SessionValidationError {
    pub session_id: i32,
    pub message: String,
}

impl SessionValidationError {
    pub fn new(session_id: i32, message: impl Into<String>) -> Self {
        Self {
            session_id,
            message: message.into(),
        }
    }
}

pub fn validate_session(session: &SessionRecord) -> Result<(), SessionValidationError> {
    let Some(start) = session.start_time else {
        return Err(SessionValidationError::new(
            session.id,
            "missing start time",
        ));
    };
    let Some(end) = session.end_time else {
        return Err(SessionValidationError::new(session.id, "missing end time"));
    };
    if end <= start {
        return Err(SessionValidationError::new(
            session.id,
            format!("end time {end} is not after start time {start}"),
        ));
    }

    if let Some(score) = session.performance_score {
        if !score.is_finite() || !(0.0..=MAX_PERFORMANCE_SCORE).contains(&score) {
            return Err(SessionValidationError::new(
                session.id,
                format!("performance score {score} must be between 0 and {MAX_PERFORMANCE_SCORE}"),
            ));
        }
    }

    Ok(())
}

pub fn ensure_unique_ids(sessions: &[SessionRecord]) -> Result<(), SessionValidationError> {
    let mut seen_ids = HashSet::with_capacity(sessions.len());
    for session in sessions {
        if !seen_ids.insert(session.id) {
            return Err(SessionValidationError::new(session.id, "duplicate session id"));
        }
    }
    Ok(())
}

pub fn validate_session_collection(sessions: &[SessionRecord]) -> Result<(), SessionValidationError> {
    ensure_unique_ids(sessions)?;
    sessions.iter().try_for_each(validate_session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    fn session(id: i32) -> SessionRecord {
        SessionRecord::new(id, 1, 1, 1, dt("2024-01-01T09:00"), dt("2024-01-01T10:00"))
    }

    #[test]
    fn rejects_missing_and_inverted_times() {
        let mut missing = session(1);
        missing.end_time = None;
        assert_eq!(
            validate_session(&missing).unwrap_err().message,
            "missing end time"
        );

        let mut inverted = session(2);
        inverted.end_time = inverted.start_time;
        assert!(validate_session(&inverted).is_err());
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let mut scored = session(1);
        scored.performance_score = Some(101.0);
        assert!(validate_session(&scored).is_err());
        scored.performance_score = Some(f64::NAN);
        assert!(validate_session(&scored).is_err());
        scored.performance_score = Some(88.5);
        assert!(validate_session(&scored).is_ok());
    }

    #[test]
    fn collection_rejects_duplicate_ids() {
        let err = validate_session_collection(&[session(4), session(4)]).unwrap_err();
        assert_eq!(err.session_id, 4);
        assert_eq!(err.to_string(), "session 4: duplicate session id");
    }
}
