#![cfg(feature = "sqlite")]

use chrono::{NaiveDateTime, Weekday};
use session_calendar::{
    CalendarConfig, SessionRecord, SessionSnapshot, SessionStatus, SessionStore,
    SqliteSessionStore,
};
use tempfile::NamedTempFile;

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

fn sessions() -> Vec<SessionRecord> {
    let mut first = SessionRecord::new(2, 10, 3, 7, dt("2025-03-03T15:00"), dt("2025-03-03T16:00"));
    first.subject_name = Some("Violin".into());
    let mut second = SessionRecord::new(1, 11, 4, 7, dt("2025-03-04T09:00"), dt("2025-03-04T09:45"));
    second.status = SessionStatus::Completed;
    second.performance_score = Some(92.0);
    vec![first, second]
}

#[test]
fn sqlite_store_round_trip_snapshot() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteSessionStore::new(file.path()).unwrap();
    let config = CalendarConfig {
        first_day_of_week: Weekday::Mon,
        ..CalendarConfig::default()
    };

    store
        .save_snapshot(&SessionSnapshot::new(sessions(), Some(config.clone())))
        .expect("save snapshot");
    drop(store);

    let reopened = SqliteSessionStore::new(file.path()).unwrap();
    let loaded = reopened.load_snapshot().unwrap().expect("snapshot stored");
    assert_eq!(loaded.config, Some(config));
    // rows come back ordered by id
    assert_eq!(loaded.sessions.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(loaded.sessions[0].performance_score, Some(92.0));
    assert_eq!(loaded.sessions[1].subject_name.as_deref(), Some("Violin"));
}

#[test]
fn empty_store_has_no_snapshot() {
    let store = SqliteSessionStore::in_memory().unwrap();
    assert!(store.load_snapshot().unwrap().is_none());
}

#[test]
fn saving_replaces_previous_snapshot() {
    let store = SqliteSessionStore::in_memory().unwrap();
    store
        .save_snapshot(&SessionSnapshot::new(sessions(), None))
        .unwrap();
    store
        .save_snapshot(&SessionSnapshot::new(sessions()[..1].to_vec(), None))
        .unwrap();

    let loaded = store.load_snapshot().unwrap().unwrap();
    assert!(loaded.config.is_none());
    assert_eq!(loaded.sessions.len(), 1);
    assert_eq!(loaded.sessions[0].id, 2);
}

#[test]
fn invalid_snapshot_is_not_written() {
    let store = SqliteSessionStore::in_memory().unwrap();
    store
        .save_snapshot(&SessionSnapshot::new(sessions(), None))
        .unwrap();

    let mut broken = sessions();
    broken[1].start_time = None;
    assert!(store.save_snapshot(&SessionSnapshot::new(broken, None)).is_err());

    let loaded = store.load_snapshot().unwrap().unwrap();
    assert_eq!(loaded.sessions.len(), 2);
    assert!(loaded.sessions.iter().all(|s| s.start_time.is_some()));
}
