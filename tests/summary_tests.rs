use chrono::NaiveDateTime;
use session_calendar::{
    SessionFilter, SessionProjector, SessionRecord, SessionStatus, SessionSummary,
    agenda::AGENDA_COLUMNS, agenda_dataframe,
};

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

fn session(id: i32, start: &str, end: &str, status: SessionStatus) -> SessionRecord {
    let mut s = SessionRecord::new(id, 1, 1, 1, dt(start), dt(end));
    s.status = status;
    s
}

fn week_of_sessions() -> Vec<SessionRecord> {
    let mut done = session(1, "2024-05-06T09:00", "2024-05-06T10:00", SessionStatus::Completed);
    done.attended = Some(true);
    done.performance_score = Some(80.0);
    let mut missed = session(2, "2024-05-07T09:00", "2024-05-07T10:00", SessionStatus::Completed);
    missed.attended = Some(false);
    missed.performance_score = Some(60.0);
    vec![
        done,
        missed,
        session(5, "2024-05-09T11:00", "2024-05-09T12:00", SessionStatus::Scheduled),
        session(4, "2024-05-09T11:00", "2024-05-09T11:30", SessionStatus::Scheduled),
        session(3, "2024-05-08T08:00", "2024-05-08T09:00", SessionStatus::Cancelled),
        session(6, "2024-05-07T15:00", "2024-05-07T16:00", SessionStatus::Scheduled),
    ]
}

#[test]
fn summary_counts_statuses_and_finds_next_session() {
    let summary = SessionSummary::from_sessions(&week_of_sessions(), dt("2024-05-08T00:00"));

    assert_eq!(summary.total, 6);
    assert_eq!(summary.scheduled, 3);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.cancelled, 1);
    // session 6 already started before now
    assert_eq!(summary.upcoming, 2);
    assert_eq!(summary.attendance_rate, Some(0.5));
    assert_eq!(summary.average_performance, Some(70.0));
    // tie on start time resolves to the lower id
    assert_eq!(summary.next_session_id, Some(4));
    assert_eq!(summary.next_session_start, Some(dt("2024-05-09T11:00")));

    assert_eq!(
        summary.to_cli_summary(),
        "sessions=6, scheduled=3, completed=2, cancelled=1, upcoming=2, attendance=50%, avg_score=70.0, next=#4@2024-05-09 11:00"
    );
}

#[test]
fn summary_of_nothing_is_empty() {
    let summary = SessionSummary::from_sessions(&[], dt("2024-05-08T00:00"));
    assert_eq!(summary, SessionSummary::default());
    assert_eq!(
        summary.to_cli_summary(),
        "sessions=0, scheduled=0, completed=0, upcoming=0"
    );
}

#[test]
fn agenda_frame_lists_one_row_per_day_and_session() {
    let mut sessions = week_of_sessions();
    sessions[0].child_name = Some("Noor".into());
    sessions[0].location = Some("Library".into());
    let projection = SessionProjector::new().project(&sessions, &SessionFilter::default());

    let df = agenda_dataframe(&projection).unwrap();
    assert_eq!(df.height(), 6);
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(names, AGENDA_COLUMNS.map(String::from).to_vec());

    let ids = df.column("id").unwrap().as_materialized_series().i32().unwrap();
    let ordered: Vec<i32> = ids.into_iter().flatten().collect();
    assert_eq!(ordered, vec![1, 2, 6, 3, 4, 5]);

    let child = df.column("child").unwrap().as_materialized_series().str().unwrap();
    assert_eq!(child.get(0), Some("Noor"));
    assert_eq!(child.get(1), None);
    let start = df.column("start").unwrap().as_materialized_series().str().unwrap();
    assert_eq!(start.get(2), Some("15:00"));
}
