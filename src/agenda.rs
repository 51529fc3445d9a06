use crate::projection::Projection;
use polars::prelude::*;

pub const AGENDA_COLUMNS: [&str; 9] = [
    "date", "start", "end", "id", "child", "subject", "teacher", "status", "location",
];

/// Flattens a projection into one row per (date, session), in date order.
pub fn agenda_dataframe(projection: &Projection) -> PolarsResult<DataFrame> {
    let mut dates: Vec<String> = Vec::new();
    let mut starts: Vec<Option<String>> = Vec::new();
    let mut ends: Vec<Option<String>> = Vec::new();
    let mut ids: Vec<i32> = Vec::new();
    let mut children: Vec<Option<&str>> = Vec::new();
    let mut subjects: Vec<Option<&str>> = Vec::new();
    let mut teachers: Vec<Option<&str>> = Vec::new();
    let mut statuses: Vec<&str> = Vec::new();
    let mut locations: Vec<Option<&str>> = Vec::new();

    for (date, sessions) in &projection.by_date {
        for session in sessions {
            dates.push(date.format("%Y-%m-%d").to_string());
            starts.push(session.start_time.map(|t| t.format("%H:%M").to_string()));
            ends.push(session.end_time.map(|t| t.format("%H:%M").to_string()));
            ids.push(session.id);
            children.push(session.child_name.as_deref());
            subjects.push(session.subject_name.as_deref());
            teachers.push(session.teacher_name.as_deref());
            statuses.push(session.status.as_str());
            locations.push(session.location.as_deref());
        }
    }

    let columns: Vec<Column> = vec![
        Series::new(PlSmallStr::from_static("date"), dates).into_column(),
        Series::new(PlSmallStr::from_static("start"), starts).into_column(),
        Series::new(PlSmallStr::from_static("end"), ends).into_column(),
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("child"), children).into_column(),
        Series::new(PlSmallStr::from_static("subject"), subjects).into_column(),
        Series::new(PlSmallStr::from_static("teacher"), teachers).into_column(),
        Series::new(PlSmallStr::from_static("status"), statuses).into_column(),
        Series::new(PlSmallStr::from_static("location"), locations).into_column(),
    ];
    DataFrame::new(columns)
}
