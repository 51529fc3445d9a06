use crate::session::{SessionRecord, SessionStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Headline numbers shown next to a calendar: status counts, attendance and
/// scores over a set of sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub upcoming: usize,
    /// Share of sessions with recorded attendance that were attended.
    pub attendance_rate: Option<f64>,
    pub average_performance: Option<f64>,
    pub next_session_id: Option<i32>,
    pub next_session_start: Option<NaiveDateTime>,
}

impl SessionSummary {
    pub fn from_sessions(sessions: &[SessionRecord], now: NaiveDateTime) -> Self {
        let mut summary = SessionSummary {
            total: sessions.len(),
            ..SessionSummary::default()
        };

        let mut attended = 0usize;
        let mut attendance_recorded = 0usize;
        let mut score_total = 0.0;
        let mut scored = 0usize;
        let mut next: Option<(NaiveDateTime, i32)> = None;

        for session in sessions {
            match session.status {
                SessionStatus::Scheduled => summary.scheduled += 1,
                SessionStatus::Completed => summary.completed += 1,
                SessionStatus::Cancelled => summary.cancelled += 1,
            }

            if let Some(was_present) = session.attended {
                attendance_recorded += 1;
                if was_present {
                    attended += 1;
                }
            }

            if let Some(score) = session.performance_score.filter(|s| s.is_finite()) {
                score_total += score;
                scored += 1;
            }

            if session.status == SessionStatus::Scheduled {
                if let Some(start) = session.start_time.filter(|start| *start > now) {
                    summary.upcoming += 1;
                    let candidate = (start, session.id);
                    if next.is_none_or(|current| candidate < current) {
                        next = Some(candidate);
                    }
                }
            }
        }

        if attendance_recorded > 0 {
            summary.attendance_rate = Some(attended as f64 / attendance_recorded as f64);
        }
        if scored > 0 {
            summary.average_performance = Some(score_total / scored as f64);
        }
        if let Some((start, id)) = next {
            summary.next_session_start = Some(start);
            summary.next_session_id = Some(id);
        }
        summary
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("sessions={}", self.total));
        parts.push(format!("scheduled={}", self.scheduled));
        parts.push(format!("completed={}", self.completed));
        if self.cancelled > 0 {
            parts.push(format!("cancelled={}", self.cancelled));
        }
        parts.push(format!("upcoming={}", self.upcoming));
        if let Some(rate) = self.attendance_rate {
            parts.push(format!("attendance={:.0}%", rate * 100.0));
        }
        if let Some(avg) = self.average_performance {
            parts.push(format!("avg_score={avg:.1}"));
        }
        if let (Some(id), Some(start)) = (self.next_session_id, self.next_session_start) {
            parts.push(format!("next=#{id}@{}", start.format("%Y-%m-%d %H:%M")));
        }
        parts.join(", ")
    }
}
