use crate::calendar::CalendarCell;
use crate::filter::SessionFilter;
use crate::session::SessionRecord;
use crate::session_validation::{self, SessionValidationError};
use crate::slots::TimeSlot;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Sessions grouped by every date they touch, plus the records that could
/// not be placed on the calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub by_date: BTreeMap<NaiveDate, Vec<SessionRecord>>,
    pub errors: Vec<SessionValidationError>,
}

impl Projection {
    pub fn sessions_on(&self, date: NaiveDate) -> &[SessionRecord] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct sessions; multi-day sessions count once.
    pub fn total_sessions(&self) -> usize {
        self.by_date
            .values()
            .flatten()
            .map(|session| session.id)
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedCell {
    #[serde(flatten)]
    pub cell: CalendarCell,
    pub sessions: Vec<SessionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridProjection {
    pub cells: Vec<ProjectedCell>,
    pub errors: Vec<SessionValidationError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotRow {
    pub slot: TimeSlot,
    pub sessions: Vec<SessionRecord>,
}

/// Places already-fetched sessions onto calendar dates and time slots.
/// Holds no state, so one instance can serve any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionProjector;

impl SessionProjector {
    pub fn new() -> Self {
        Self
    }

    pub fn project(&self, sessions: &[SessionRecord], filter: &SessionFilter) -> Projection {
        self.project_range(sessions, filter, NaiveDate::MIN, NaiveDate::MAX)
    }

    /// Same as [`project`](Self::project) but only materializes dates in
    /// `from..=to`; long sessions cost nothing outside the window.
    pub fn project_range(
        &self,
        sessions: &[SessionRecord],
        filter: &SessionFilter,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Projection {
        let (accepted, errors) = self.select(sessions, filter);

        let mut by_date: BTreeMap<NaiveDate, Vec<SessionRecord>> = BTreeMap::new();
        for session in accepted {
            for date in session.covered_dates_within(from, to) {
                by_date.entry(date).or_default().push(session.clone());
            }
        }
        for day in by_date.values_mut() {
            sort_sessions(day);
        }

        debug!(
            dates = by_date.len(),
            rejected = errors.len(),
            "projected sessions onto calendar"
        );
        Projection { by_date, errors }
    }

    /// Pairs every grid cell with its sessions, keeping grid order.
    pub fn project_grid(
        &self,
        cells: &[CalendarCell],
        sessions: &[SessionRecord],
        filter: &SessionFilter,
    ) -> GridProjection {
        let (from, to) = match (cells.first(), cells.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => (NaiveDate::MAX, NaiveDate::MIN),
        };
        let Projection { mut by_date, errors } = self.project_range(sessions, filter, from, to);
        let cells = cells
            .iter()
            .map(|cell| ProjectedCell {
                cell: *cell,
                sessions: by_date.remove(&cell.date).unwrap_or_default(),
            })
            .collect();
        GridProjection { cells, errors }
    }

    /// Valid sessions overlapping `slot` on `date`, ordered by start then id.
    pub fn sessions_in_slot(
        &self,
        sessions: &[SessionRecord],
        date: NaiveDate,
        slot: &TimeSlot,
    ) -> Vec<SessionRecord> {
        let (slot_start, slot_end) = slot.on(date);
        let mut hits: Vec<SessionRecord> = sessions
            .iter()
            .filter(|session| session_validation::validate_session(session).is_ok())
            .filter(|session| session.overlaps(slot_start, slot_end))
            .cloned()
            .collect();
        sort_sessions(&mut hits);
        hits
    }

    /// One row per slot for a single day, as in a single-day agenda.
    pub fn project_slots(
        &self,
        sessions: &[SessionRecord],
        date: NaiveDate,
        slots: &[TimeSlot],
        filter: &SessionFilter,
    ) -> Vec<SlotRow> {
        let (accepted, _) = self.select(sessions, filter);
        let accepted: Vec<SessionRecord> = accepted.into_iter().cloned().collect();
        slots
            .iter()
            .map(|slot| SlotRow {
                slot: slot.clone(),
                sessions: self.sessions_in_slot(&accepted, date, slot),
            })
            .collect()
    }

    /// Splits input into records passing validation and the filter, and
    /// validation failures. Input order is kept in both outputs.
    fn select<'a>(
        &self,
        sessions: &'a [SessionRecord],
        filter: &SessionFilter,
    ) -> (Vec<&'a SessionRecord>, Vec<SessionValidationError>) {
        let outcomes: Vec<Result<&SessionRecord, SessionValidationError>> = sessions
            .par_iter()
            .filter_map(|session| match session_validation::validate_session(session) {
                Ok(()) => filter.matches(session).then_some(Ok(session)),
                Err(err) => Some(Err(err)),
            })
            .collect();

        let mut accepted = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(session) => accepted.push(session),
                Err(err) => {
                    warn!(session_id = err.session_id, "excluding session from calendar: {}", err.message);
                    errors.push(err);
                }
            }
        }
        (accepted, errors)
    }
}

fn sort_sessions(sessions: &mut [SessionRecord]) {
    sessions.sort_by(compare_sessions);
}

fn compare_sessions(a: &SessionRecord, b: &SessionRecord) -> Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then_with(|| a.id.cmp(&b.id))
}
