use crate::calendar::dates_between;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Scheduled,
    Completed,
    #[serde(alias = "canceled")]
    Cancelled,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 3] = [
        SessionStatus::Scheduled,
        SessionStatus::Completed,
        SessionStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// Lifecycle owned by the datastore: scheduled sessions end up either
    /// completed or cancelled, and both of those are final.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (
                SessionStatus::Scheduled,
                SessionStatus::Completed | SessionStatus::Cancelled
            )
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "completed" => Ok(SessionStatus::Completed),
            // the admin screens spell it both ways
            "cancelled" | "canceled" => Ok(SessionStatus::Cancelled),
            _ => Err(format!("unknown session status '{s}'")),
        }
    }
}

/// A tutoring session as fetched from the datastore. Timestamps are optional
/// because upstream rows can be incomplete; such rows are reported rather
/// than projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i32,
    pub child_id: i32,
    pub subject_id: i32,
    pub teacher_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
}

impl SessionRecord {
    pub fn new(
        id: i32,
        child_id: i32,
        subject_id: i32,
        teacher_id: i32,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            child_id,
            subject_id,
            teacher_id,
            start_time: Some(start_time),
            end_time: Some(end_time),
            status: SessionStatus::Scheduled,
            attended: None,
            performance_score: None,
            location: None,
            notes: None,
            child_name: None,
            teacher_name: None,
            subject_name: None,
        }
    }

    /// Half-open overlap with `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        match (self.start_time, self.end_time) {
            (Some(own_start), Some(own_end)) => own_start < end && own_end > start,
            _ => false,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_time.map(|start| start.date())
    }

    pub fn duration_minutes(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        }
    }

    /// Calendar dates in `from..=to` whose `[00:00, next 00:00)` window the
    /// session touches. Empty when the interval is missing or inverted.
    pub fn covered_dates_within(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let (Some(start), Some(end)) = (self.start_time, self.end_time) else {
            return Vec::new();
        };
        if end <= start {
            return Vec::new();
        }
        let last_instant = end
            .checked_sub_signed(Duration::nanoseconds(1))
            .unwrap_or(start);
        dates_between(start.date().max(from), last_instant.date().min(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn status_transitions_only_leave_scheduled() {
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Completed));
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Cancelled));
        assert!(!SessionStatus::Completed.can_transition_to(SessionStatus::Cancelled));
        assert!(!SessionStatus::Cancelled.can_transition_to(SessionStatus::Scheduled));
    }

    #[test]
    fn status_parses_both_spellings() {
        assert_eq!("Canceled".parse::<SessionStatus>(), Ok(SessionStatus::Cancelled));
        assert_eq!("completed".parse::<SessionStatus>(), Ok(SessionStatus::Completed));
        assert!("pending".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn session_ending_at_midnight_stays_on_one_day() {
        let session = SessionRecord::new(1, 1, 1, 1, dt("2024-01-01T22:00"), dt("2024-01-02T00:00"));
        assert_eq!(session.covered_dates_within(NaiveDate::MIN, NaiveDate::MAX), vec![dt("2024-01-01T00:00").date()]);
    }

    #[test]
    fn overnight_session_covers_both_days() {
        let session = SessionRecord::new(1, 1, 1, 1, dt("2024-01-01T23:00"), dt("2024-01-02T01:00"));
        assert_eq!(session.covered_dates_within(NaiveDate::MIN, NaiveDate::MAX).len(), 2);
        assert_eq!(session.duration_minutes(), Some(120));
    }

    #[test]
    fn covered_dates_clip_to_window() {
        let session = SessionRecord::new(1, 1, 1, 1, dt("1500-01-01T00:00"), dt("2500-01-01T00:00"));
        let from = dt("2024-03-01T00:00").date();
        let to = dt("2024-03-03T00:00").date();
        assert_eq!(session.covered_dates_within(from, to).len(), 3);
        assert!(session.covered_dates_within(to, from).is_empty());
    }

    #[test]
    fn cancelled_deserializes_from_either_spelling() {
        let canceled: SessionStatus = serde_json::from_str("\"canceled\"").unwrap();
        let cancelled: SessionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(canceled, SessionStatus::Cancelled);
        assert_eq!(cancelled, SessionStatus::Cancelled);
        assert_eq!(serde_json::to_string(&canceled).unwrap(), "\"cancelled\"");
    }
}
