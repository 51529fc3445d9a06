use crate::session::{SessionRecord, SessionStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable set of criteria a session must satisfy to be projected.
/// Unset fields match everything; set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range_end: Option<NaiveDate>,
}

impl SessionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_child(mut self, child_id: i32) -> Self {
        self.child_id = Some(child_id);
        self
    }

    pub fn with_subject(mut self, subject_id: i32) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range_start = start;
        self.date_range_end = end;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.child_id.is_none()
            && self.subject_id.is_none()
            && self.status.is_none()
            && self.search_needle().is_none()
            && self.date_range_start.is_none()
            && self.date_range_end.is_none()
    }

    pub fn matches(&self, session: &SessionRecord) -> bool {
        if self.child_id.is_some_and(|id| id != session.child_id) {
            return false;
        }
        if self.subject_id.is_some_and(|id| id != session.subject_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != session.status) {
            return false;
        }
        if let Some(needle) = self.search_needle() {
            if !Self::text_matches(session, &needle) {
                return false;
            }
        }
        self.date_in_range(session)
    }

    fn search_needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase)
    }

    fn text_matches(session: &SessionRecord, needle: &str) -> bool {
        [
            session.child_name.as_deref(),
            session.teacher_name.as_deref(),
            session.subject_name.as_deref(),
            session.notes.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_lowercase().contains(needle))
    }

    fn date_in_range(&self, session: &SessionRecord) -> bool {
        if self.date_range_start.is_none() && self.date_range_end.is_none() {
            return true;
        }
        let Some(date) = session.start_date() else {
            return false;
        };
        self.date_range_start.is_none_or(|start| date >= start)
            && self.date_range_end.is_none_or(|end| date <= end)
    }
}
