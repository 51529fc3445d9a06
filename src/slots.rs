use crate::calendar::CalendarConfig;
use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A bookable block of time within a day. `start_time`/`end_time` are kept
/// as 24-hour values for comparisons; `label` is display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub label: String,
}

impl TimeSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
            label: twelve_hour_label(start_time),
        }
    }

    /// `"08:00-09:00"`
    pub fn range_label(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Anchors the slot to a concrete date.
    pub fn on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (date.and_time(self.start_time), date.and_time(self.end_time))
    }
}

fn twelve_hour_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn generate_slots(
    start: NaiveTime,
    end: NaiveTime,
    interval_minutes: i64,
) -> ScheduleResult<Vec<TimeSlot>> {
    if interval_minutes <= 0 {
        return Err(ScheduleError::invalid(format!(
            "slot interval must be a positive number of minutes (got {interval_minutes})"
        )));
    }
    if start >= end {
        return Err(ScheduleError::invalid(format!(
            "slot start {start} must be before slot end {end}"
        )));
    }
    let step = Duration::try_minutes(interval_minutes).ok_or_else(|| {
        ScheduleError::invalid(format!("slot interval {interval_minutes} is too large"))
    })?;

    let mut slots = Vec::new();
    let mut cursor = start;
    while cursor < end {
        // wrapping past midnight means the step overshoots the day
        let (next, wrapped) = cursor.overflowing_add_signed(step);
        let slot_end = if wrapped != 0 || next > end { end } else { next };
        slots.push(TimeSlot::new(cursor, slot_end));
        cursor = slot_end;
    }
    Ok(slots)
}

pub fn generate_slots_from_str(
    start: &str,
    end: &str,
    interval_minutes: i64,
) -> ScheduleResult<Vec<TimeSlot>> {
    generate_slots(parse_time(start)?, parse_time(end)?, interval_minutes)
}

pub fn generate_slots_for_config(config: &CalendarConfig) -> ScheduleResult<Vec<TimeSlot>> {
    generate_slots(config.day_start, config.day_end, config.slot_interval_minutes)
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(value: &str) -> ScheduleResult<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ScheduleError::invalid(format!("invalid time '{value}' (expected HH:MM)")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn labels_use_twelve_hour_clock() {
        assert_eq!(TimeSlot::new(t(8, 0), t(9, 0)).label, "8:00 AM");
        assert_eq!(TimeSlot::new(t(13, 30), t(14, 0)).label, "1:30 PM");
        assert_eq!(TimeSlot::new(t(0, 15), t(1, 0)).label, "12:15 AM");
    }

    #[test]
    fn parse_time_accepts_seconds() {
        assert_eq!(parse_time("08:00").unwrap(), t(8, 0));
        assert_eq!(parse_time("08:00:00").unwrap(), t(8, 0));
        assert!(parse_time("8am").is_err());
    }

    #[test]
    fn step_past_midnight_is_clipped() {
        let slots = generate_slots(t(22, 0), NaiveTime::from_hms_opt(23, 59, 59).unwrap(), 180)
            .unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end_time, NaiveTime::from_hms_opt(23, 59, 59).unwrap());
    }
}
