use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Granularity of a calendar view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    #[default]
    Week,
    Month,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Day, ViewMode::Week, ViewMode::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Day => "day",
            ViewMode::Week => "week",
            ViewMode::Month => "month",
        }
    }

    /// Lenient parse used by request handlers: anything unrecognised becomes `Week`.
    pub fn parse_or_default(value: &str) -> Self {
        match Self::from_str(value) {
            Ok(mode) => mode,
            Err(_) => {
                warn!(view = value, "unknown view mode, falling back to week");
                ViewMode::default()
            }
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| {
                ScheduleError::invalid(format!(
                    "unknown view mode '{s}' (expected day, week or month)"
                ))
            })
    }
}

/// One rendered day of a calendar grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub belongs_to_current_period: bool,
    pub is_today: bool,
    pub is_past: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "CalendarConfig::default_first_day")]
    pub first_day_of_week: Weekday,
    /// Offset from UTC used to decide which date is "today".
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "CalendarConfig::default_day_start")]
    pub day_start: NaiveTime,
    #[serde(default = "CalendarConfig::default_day_end")]
    pub day_end: NaiveTime,
    #[serde(default = "CalendarConfig::default_interval")]
    pub slot_interval_minutes: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            first_day_of_week: Self::default_first_day(),
            utc_offset_minutes: 0,
            day_start: Self::default_day_start(),
            day_end: Self::default_day_end(),
            slot_interval_minutes: Self::default_interval(),
        }
    }
}

impl CalendarConfig {
    const MAX_OFFSET_MINUTES: u32 = 24 * 60;

    fn default_first_day() -> Weekday {
        Weekday::Sun
    }

    fn default_day_start() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    fn default_day_end() -> NaiveTime {
        NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN)
    }

    fn default_interval() -> i64 {
        60
    }

    pub fn validate(&self) -> ScheduleResult<()> {
        self.timezone()?;
        if self.slot_interval_minutes <= 0 {
            return Err(ScheduleError::invalid(format!(
                "slot interval must be positive (got {})",
                self.slot_interval_minutes
            )));
        }
        if self.day_start >= self.day_end {
            return Err(ScheduleError::invalid(format!(
                "day start {} must be before day end {}",
                self.day_start, self.day_end
            )));
        }
        Ok(())
    }

    pub fn timezone(&self) -> ScheduleResult<FixedOffset> {
        let out_of_range = || {
            ScheduleError::invalid(format!(
                "utc offset {} minutes is out of range",
                self.utc_offset_minutes
            ))
        };
        if self.utc_offset_minutes.unsigned_abs() >= Self::MAX_OFFSET_MINUTES {
            return Err(out_of_range());
        }
        let seconds = self.utc_offset_minutes.checked_mul(60).ok_or_else(out_of_range)?;
        FixedOffset::east_opt(seconds).ok_or_else(out_of_range)
    }

    /// Current date at the configured offset.
    pub fn today(&self) -> ScheduleResult<NaiveDate> {
        let tz = self.timezone()?;
        Ok(Utc::now().with_timezone(&tz).date_naive())
    }
}

/// Builds fixed-shape calendar grids around a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarGridBuilder {
    first_day_of_week: Weekday,
    today: NaiveDate,
}

impl CalendarGridBuilder {
    pub fn from_config(config: &CalendarConfig) -> ScheduleResult<Self> {
        Ok(Self {
            first_day_of_week: config.first_day_of_week,
            today: config.today()?,
        })
    }

    /// Builder pinned to a known "today", for callers that own the clock.
    pub fn with_today(first_day_of_week: Weekday, today: NaiveDate) -> Self {
        Self {
            first_day_of_week,
            today,
        }
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn build_grid(&self, reference: NaiveDate, view: ViewMode) -> Vec<CalendarCell> {
        let (grid_start, grid_end) = self.grid_range(reference, view);
        let (period_start, period_end) = self.period_range(reference, view);

        dates_between(grid_start, grid_end)
            .into_iter()
            .map(|date| CalendarCell {
                date,
                belongs_to_current_period: date >= period_start && date <= period_end,
                is_today: date == self.today,
                is_past: date < self.today,
            })
            .collect()
    }

    /// Inclusive bounds of the period itself, without padding.
    pub fn period_range(&self, reference: NaiveDate, view: ViewMode) -> (NaiveDate, NaiveDate) {
        match view {
            ViewMode::Day => (reference, reference),
            ViewMode::Week => {
                let start = start_of_week(reference, self.first_day_of_week);
                (start, end_of_week(reference, self.first_day_of_week))
            }
            ViewMode::Month => (first_of_month(reference), last_of_month(reference)),
        }
    }

    /// Inclusive bounds of the padded grid.
    pub fn grid_range(&self, reference: NaiveDate, view: ViewMode) -> (NaiveDate, NaiveDate) {
        match view {
            ViewMode::Day | ViewMode::Week => self.period_range(reference, view),
            ViewMode::Month => (
                start_of_week(first_of_month(reference), self.first_day_of_week),
                end_of_week(last_of_month(reference), self.first_day_of_week),
            ),
        }
    }

    /// Moves the reference date by whole periods. Month steps clamp the day
    /// to the target month's length; out-of-range shifts leave the date as is.
    pub fn shift_period(&self, reference: NaiveDate, view: ViewMode, steps: i32) -> NaiveDate {
        let shifted = match view {
            ViewMode::Day => reference.checked_add_signed(Duration::days(i64::from(steps))),
            ViewMode::Week => reference.checked_add_signed(Duration::weeks(i64::from(steps))),
            ViewMode::Month => {
                let months = Months::new(steps.unsigned_abs());
                if steps >= 0 {
                    reference.checked_add_months(months)
                } else {
                    reference.checked_sub_months(months)
                }
            }
        };
        shifted.unwrap_or(reference)
    }

    pub fn period_title(&self, reference: NaiveDate, view: ViewMode) -> String {
        match view {
            ViewMode::Day => reference.format("%A, %B %-d, %Y").to_string(),
            ViewMode::Week => {
                let (start, end) = self.period_range(reference, view);
                format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
            }
            ViewMode::Month => reference.format("%B %Y").to_string(),
        }
    }
}

/// Weeks cut by the representable date range are clamped to
/// `NaiveDate::MIN`/`NaiveDate::MAX`, so edge grids come out shorter.
pub fn start_of_week(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_sunday() + 7 - first_day.num_days_from_sunday()) % 7;
    date.checked_sub_signed(Duration::days(i64::from(offset)))
        .unwrap_or(NaiveDate::MIN)
}

pub fn end_of_week(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (first_day.num_days_from_sunday() + 6 + 7 - date.weekday().num_days_from_sunday()) % 7;
    date.checked_add_signed(Duration::days(i64::from(offset)))
        .unwrap_or(NaiveDate::MAX)
}

/// Every date in `from..=to`, including `NaiveDate::MAX` when it is the end.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut date = from;
    while date <= to {
        dates.push(date);
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    dates
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
