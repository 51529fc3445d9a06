#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

fn stdout_of(script: &str) -> String {
    let assert = run_cli(script).success();
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

const PINNED: &str = "today 2024-03-15\n";

#[test]
fn cli_month_grid_marks_today_and_padding_days() {
    let output = stdout_of(&format!(
        "{PINNED}add 1 10 5 7 2024-03-15T09:30 2024-03-15T10:30\ngrid\nquit\n"
    ));
    assert!(output.contains("March 2024"));
    assert!(output.contains("Sun    Mon    Tue    Wed    Thu    Fri    Sat"));
    assert!(output.contains("25~"), "leading February days are marked");
    assert!(output.contains("15*(1)"), "today shows its session count");
    assert!(output.contains(" 6~"), "grid runs into April");
}

#[test]
fn cli_day_agenda_shows_session_in_both_overlapping_slots() {
    let output = stdout_of(&format!(
        "{PINNED}add 1 10 5 7 2024-03-15T09:30 2024-03-15T10:30\nday 2024-03-15\nquit\n"
    ));
    assert!(output.contains("Session added."));
    assert!(output.contains("Friday, March 15, 2024"));
    assert!(output.contains("9:00 AM   #1"));
    assert!(output.contains("10:00 AM  #1"));
}

#[test]
fn cli_status_changes_follow_lifecycle() {
    run_cli(&format!(
        "{PINNED}add 1 10 5 7 2024-03-15T09:00 2024-03-15T10:00\nstatus 1 completed\nstatus 1 scheduled\nquit\n"
    ))
    .success()
    .stdout(str_contains("Status updated."))
    .stdout(str_contains("Cannot move session 1 from completed to scheduled."));
}

#[test]
fn cli_rejects_session_ending_before_start() {
    run_cli("add 1 10 5 7 2024-03-15T11:00 2024-03-15T10:00\nquit\n")
        .success()
        .stdout(str_contains("Error: session 1: end time 2024-03-15 10:00:00 is not after start time"));
}

#[test]
fn cli_filter_and_summary() {
    let script = format!(
        "{PINNED}add 1 10 5 7 2024-03-18T09:00 2024-03-18T10:00\nadd 2 11 6 7 2024-03-19T09:00 2024-03-19T10:00\nfilter subject 5\nagenda\nfilter clear\nfilter show\nsummary\nquit\n"
    );
    let output = stdout_of(&script);
    assert!(output.contains(r#"Filter: {"subject_id":5}"#));
    assert!(output.contains("| 2024-03-18 |"));
    assert!(!output.contains("| 2024-03-19 |"));
    assert!(output.contains("Filter cleared."));
    assert!(output.contains("No filter set."));
    assert!(output.contains(
        "Summary: sessions=2, scheduled=2, completed=0, upcoming=2, next=#1@2024-03-18 09:00"
    ));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "{PINNED}add 1 10 5 7 2024-03-15T09:00 2024-03-15T10:00\nsave json {path}\nadd 2 10 5 7 2024-03-16T09:00 2024-03-16T10:00\nload json {path}\nday 2024-03-16\nday 2024-03-15\nquit\n"
    );
    let output = stdout_of(&script);
    assert!(output.contains("Sessions saved to"));
    assert!(output.contains("Sessions loaded from"));
    let after_reload = output
        .split("Sessions loaded from")
        .last()
        .unwrap_or_default();
    assert!(!after_reload.contains("#2"), "unsaved session should be gone");
    assert!(after_reload.contains("#1"));
}

#[test]
fn cli_reports_invalid_sessions_from_csv() {
    let csv = NamedTempFile::new().expect("create temp file");
    std::fs::write(
        csv.path(),
        "id,child_id,subject_id,teacher_id,start_time,end_time,status\n\
         1,10,5,7,2024-03-15 09:00,2024-03-15 10:00,scheduled\n\
         2,10,5,7,,2024-03-15 11:00,scheduled\n",
    )
    .unwrap();
    let path = csv.path().to_string_lossy().replace('\\', "\\\\");
    run_cli(&format!("{PINNED}load csv {path}\ngrid\nerrors\nquit\n"))
        .success()
        .stdout(str_contains("1 session(s) skipped, see 'errors'"))
        .stdout(str_contains("session 2: missing start time"));
}

#[test]
fn cli_unknown_command() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}

#[test]
fn cli_grid_and_agenda_accept_a_date() {
    let output = stdout_of(&format!(
        "{PINNED}add 1 10 5 7 2024-05-06T09:00 2024-05-06T10:00\nadd 2 10 5 7 2024-03-18T09:00 2024-03-18T10:00\nagenda 2024-05-20\ngrid 2024-05-02\nquit\n"
    ));
    let (agenda, grid) = output
        .split_once("May 2024")
        .expect("grid title for May");
    assert!(agenda.contains("| 2024-05-06 |"));
    assert!(!agenda.contains("| 2024-03-18 |"));
    assert!(grid.contains(" 6 (1)"));
}

#[test]
fn cli_summary_uses_clock_when_today_is_not_pinned() {
    run_cli("add 1 10 5 7 2000-01-01T09:00 2000-01-01T10:00\nadd 2 10 5 7 2999-01-01T09:00 2999-01-01T10:00\nsummary\nquit\n")
        .success()
        .stdout(str_contains("upcoming=1, next=#2@2999-01-01 09:00"));
}

#[test]
fn cli_rejects_malformed_grid_date() {
    run_cli("grid 2024-13-01\nquit\n")
        .success()
        .stdout(str_contains("Invalid date (YYYY-MM-DD)"));
}

#[test]
fn cli_day_view_describes_sessions_with_duration() {
    run_cli(&format!(
        "{PINNED}add 3 10 5 7 2024-03-15T09:00 2024-03-15T10:30\nview day\nquit\n"
    ))
    .success()
    .stdout(str_contains("Friday, March 15, 2024"))
    .stdout(str_contains(
        "#3 2024-03-15 09:00 - 2024-03-15 10:30 (90 min) child=10 subject=5 teacher=7 [scheduled]",
    ));
}
