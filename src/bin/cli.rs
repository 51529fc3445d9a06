use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use polars::prelude::{AnyValue, DataFrame};
use session_calendar::{
    CalendarCell, CalendarConfig, CalendarGridBuilder, SessionFilter, SessionProjector,
    SessionRecord, SessionSnapshot, SessionStatus, SessionSummary, TimeSlot, ViewMode,
    agenda_dataframe, generate_slots, generate_slots_for_config, load_config_from_json,
    load_sessions_from_csv, load_snapshot_from_json, persistence::file::parse_timestamp,
    save_config_to_json, save_sessions_to_csv, save_snapshot_to_json, slots::parse_time,
};
use std::io::{self, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

struct CliState {
    sessions: Vec<SessionRecord>,
    config: CalendarConfig,
    builder: CalendarGridBuilder,
    reference: NaiveDate,
    view: ViewMode,
    filter: SessionFilter,
    today_pinned: bool,
}

impl CliState {
    fn new() -> Self {
        let config = CalendarConfig::default();
        let today = config.today().unwrap_or_else(|_| Utc::now().date_naive());
        Self {
            builder: CalendarGridBuilder::with_today(config.first_day_of_week, today),
            sessions: Vec::new(),
            config,
            reference: today,
            view: ViewMode::Month,
            filter: SessionFilter::default(),
            today_pinned: false,
        }
    }

    fn set_config(&mut self, config: CalendarConfig) {
        let today = if self.today_pinned {
            self.builder.today()
        } else {
            config.today().unwrap_or_else(|_| self.builder.today())
        };
        self.builder = CalendarGridBuilder::with_today(config.first_day_of_week, today);
        self.config = config;
    }

    fn set_today(&mut self, today: NaiveDate) {
        self.builder = CalendarGridBuilder::with_today(self.config.first_day_of_week, today);
        self.reference = today;
        self.today_pinned = true;
    }

    /// Start of the pinned day, or the wall clock at the configured offset.
    fn now(&self) -> NaiveDateTime {
        if self.today_pinned {
            return self.builder.today().and_time(NaiveTime::MIN);
        }
        match self.config.timezone() {
            Ok(tz) => Utc::now().with_timezone(&tz).naive_local(),
            Err(_) => Utc::now().naive_utc(),
        }
    }
}

fn cell_text(av: &AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                widths[ci] = widths[ci].max(cell_text(av).len());
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push_str(&format!(" {:<width$} |", name, width = widths[i]));
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let text = col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default();
            out.push_str(&format!(" {:<width$} |", text, width = widths[ci]));
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn weekday_header(first_day: Weekday) -> String {
    let mut day = first_day;
    let mut names = Vec::with_capacity(7);
    for _ in 0..7 {
        names.push(format!("{:<7}", day.to_string()));
        day = day.succ();
    }
    names.join("").trim_end().to_string()
}

fn render_cell(cell: &CalendarCell, session_count: usize) -> String {
    let marker = if cell.is_today {
        '*'
    } else if !cell.belongs_to_current_period {
        '~'
    } else {
        ' '
    };
    let count = if session_count > 0 {
        format!("({session_count})")
    } else {
        String::new()
    };
    format!("{:>2}{}{:<4}", cell.date.day(), marker, count)
}

fn render_grid(state: &CliState) -> String {
    let cells = state.builder.build_grid(state.reference, state.view);
    let grid = SessionProjector::new().project_grid(&cells, &state.sessions, &state.filter);

    let mut out = String::new();
    out.push_str(&state.builder.period_title(state.reference, state.view));
    out.push('\n');
    if state.view == ViewMode::Day {
        for projected in &grid.cells {
            out.push_str(&format!("{} session(s)\n", projected.sessions.len()));
            for session in &projected.sessions {
                out.push_str(&format!("  {}\n", describe_session(session)));
            }
        }
    } else {
        out.push_str(&weekday_header(state.builder.first_day_of_week()));
        out.push('\n');
        for week in grid.cells.chunks(7) {
            let row: Vec<String> = week
                .iter()
                .map(|projected| render_cell(&projected.cell, projected.sessions.len()))
                .collect();
            out.push_str(row.join("").trim_end());
            out.push('\n');
        }
    }
    if !grid.errors.is_empty() {
        out.push_str(&format!("{} session(s) skipped, see 'errors'\n", grid.errors.len()));
    }
    out
}

fn describe_session(session: &SessionRecord) -> String {
    let fmt_time = |t: Option<NaiveDateTime>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    let minutes = session
        .duration_minutes()
        .map(|m| format!(" ({m} min)"))
        .unwrap_or_default();
    format!(
        "#{} {} - {}{} child={} subject={} teacher={} [{}]",
        session.id,
        fmt_time(session.start_time),
        fmt_time(session.end_time),
        minutes,
        session.child_name.clone().unwrap_or_else(|| session.child_id.to_string()),
        session.subject_name.clone().unwrap_or_else(|| session.subject_id.to_string()),
        session.teacher_name.clone().unwrap_or_else(|| session.teacher_id.to_string()),
        session.status
    )
}

fn render_slots(slots: &[TimeSlot]) -> String {
    slots
        .iter()
        .map(|slot| format!("{:<9} {}", slot.label, slot.range_label()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  today <YYYY-MM-DD>                 Pin the date treated as today\n  date <YYYY-MM-DD>                  Set the reference date\n  view <day|week|month>              Set the view mode\n  grid [YYYY-MM-DD]                  Show the calendar grid (optionally jump to a date)\n  next | prev                        Move one period forward/back\n  slots [start end interval]         Show bookable slots (HH:MM HH:MM minutes)\n  day [YYYY-MM-DD]                   Show sessions per slot for one day\n  agenda [YYYY-MM-DD]                Show sessions in the period as a table\n  add <id> <child> <subject> <teacher> <start> <end>\n                                     Add a session (start/end like 2024-03-15T09:00)\n  status <id> <scheduled|completed|cancelled>\n                                     Change a session's status\n  filter child|subject|status|search|from|to <value>\n                                     Narrow the sessions shown\n  filter show | filter clear          Inspect or reset the filter\n  summary                            Session counts and attendance\n  errors                             Sessions that could not be placed\n  config show                        Show calendar configuration\n  config load <json_path>            Load calendar configuration\n  config save <json_path>            Save calendar configuration\n  save <json|csv> <path>             Persist sessions to disk\n  load <json|csv> <path>             Load sessions from disk\n  quit|exit                          Exit"
    );
}

fn print_config(config: &CalendarConfig) {
    println!("First day of week  : {}", config.first_day_of_week);
    println!("UTC offset (min)   : {}", config.utc_offset_minutes);
    println!("Day start          : {}", config.day_start.format("%H:%M"));
    println!("Day end            : {}", config.day_end.format("%H:%M"));
    println!("Slot interval (min): {}", config.slot_interval_minutes);
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn apply_filter_command(state: &mut CliState, field: &str, value: &str) -> Result<(), String> {
    let mut filter = state.filter.clone();
    match field {
        "child" => filter.child_id = Some(value.parse().map_err(|_| "Invalid child id")?),
        "subject" => filter.subject_id = Some(value.parse().map_err(|_| "Invalid subject id")?),
        "status" => filter.status = Some(SessionStatus::from_str(value)?),
        "search" => filter.search_text = Some(value.to_string()),
        "from" => filter.date_range_start = Some(parse_date(value).ok_or("Invalid date (YYYY-MM-DD)")?),
        "to" => filter.date_range_end = Some(parse_date(value).ok_or("Invalid date (YYYY-MM-DD)")?),
        other => return Err(format!("Unknown filter field '{other}'")),
    }
    state.filter = filter;
    Ok(())
}

fn print_filter(filter: &SessionFilter) {
    if filter.is_empty() {
        println!("No filter set.");
        return;
    }
    match serde_json::to_string(filter) {
        Ok(json) => println!("Filter: {json}"),
        Err(e) => println!("Error: {e}"),
    }
}

fn print_agenda(state: &CliState, reference: NaiveDate) {
    let (start, end) = state.builder.period_range(reference, state.view);
    let projection =
        SessionProjector::new().project_range(&state.sessions, &state.filter, start, end);
    match agenda_dataframe(&projection) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {e}"),
    }
}

fn print_day(state: &CliState, date: NaiveDate) {
    let slots = match generate_slots_for_config(&state.config) {
        Ok(slots) => slots,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    let rows = SessionProjector::new().project_slots(&state.sessions, date, &slots, &state.filter);
    println!("{}", date.format("%A, %B %-d, %Y"));
    for row in rows {
        let ids = row
            .sessions
            .iter()
            .map(|s| format!("#{}", s.id))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<9} {}", row.slot.label, ids);
    }
}

fn add_session(state: &mut CliState, args: &[&str]) -> Result<(), String> {
    let [id, child, subject, teacher, start, end] = args else {
        return Err("Usage: add <id> <child> <subject> <teacher> <start> <end>".into());
    };
    let parse_id = |s: &str| s.parse::<i32>().map_err(|_| format!("Invalid id '{s}'"));
    let id = parse_id(*id)?;
    if state.sessions.iter().any(|s| s.id == id) {
        return Err(format!("Session {id} already exists."));
    }
    let start = parse_timestamp(*start).ok_or("Invalid start (YYYY-MM-DDTHH:MM)")?;
    let end = parse_timestamp(*end).ok_or("Invalid end (YYYY-MM-DDTHH:MM)")?;
    let session = SessionRecord::new(
        id,
        parse_id(*child)?,
        parse_id(*subject)?,
        parse_id(*teacher)?,
        start,
        end,
    );
    session_calendar::validate_session(&session).map_err(|e| e.to_string())?;
    state.sessions.push(session);
    Ok(())
}

fn set_status(state: &mut CliState, id_s: &str, status_s: &str) -> Result<(), String> {
    let id: i32 = id_s.parse().map_err(|_| "Invalid id".to_string())?;
    let next = SessionStatus::from_str(status_s)?;
    let session = state
        .sessions
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| format!("Session {id} not found."))?;
    if !session.status.can_transition_to(next) {
        return Err(format!(
            "Cannot move session {id} from {} to {next}.",
            session.status
        ));
    }
    session.status = next;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut state = CliState::new();

    println!("Session Calendar (CLI) - type 'help' for commands\n");
    println!("{}", render_grid(&state));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0];
        let args = &parts[1..];

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "grid" => match args.first() {
                None => println!("{}", render_grid(&state)),
                Some(s) => match parse_date(s) {
                    Some(date) => {
                        state.reference = date;
                        println!("{}", render_grid(&state));
                    }
                    None => println!("Invalid date (YYYY-MM-DD)"),
                },
            },
            "today" | "date" => match args.first().and_then(|s| parse_date(s)) {
                Some(date) => {
                    if cmd == "today" {
                        state.set_today(date);
                    } else {
                        state.reference = date;
                    }
                    println!("{}", render_grid(&state));
                }
                None => println!("Usage: {cmd} <YYYY-MM-DD>"),
            },
            "view" => match args.first().map(|s| ViewMode::from_str(s)) {
                Some(Ok(view)) => {
                    state.view = view;
                    println!("{}", render_grid(&state));
                }
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: view <day|week|month>"),
            },
            "next" | "prev" => {
                let steps = if cmd == "next" { 1 } else { -1 };
                state.reference = state.builder.shift_period(state.reference, state.view, steps);
                println!("{}", render_grid(&state));
            }
            "slots" => {
                let result = match args {
                    [] => generate_slots_for_config(&state.config),
                    [start, end, interval] => match interval.parse::<i64>() {
                        Ok(interval) => parse_time(start).and_then(|start| {
                            parse_time(end).and_then(|end| generate_slots(start, end, interval))
                        }),
                        Err(_) => {
                            println!("Invalid interval");
                            continue;
                        }
                    },
                    _ => {
                        println!("Usage: slots [start end interval]");
                        continue;
                    }
                };
                match result {
                    Ok(slots) => println!("{} slot(s)\n{}", slots.len(), render_slots(&slots)),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "day" => {
                let date = match args.first() {
                    Some(s) => match parse_date(s) {
                        Some(date) => date,
                        None => {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        }
                    },
                    None => state.reference,
                };
                print_day(&state, date);
            }
            "agenda" => match args.first() {
                None => print_agenda(&state, state.reference),
                Some(s) => match parse_date(s) {
                    Some(date) => print_agenda(&state, date),
                    None => println!("Invalid date (YYYY-MM-DD)"),
                },
            },
            "add" => match add_session(&mut state, args) {
                Ok(()) => println!("Session added."),
                Err(e) => println!("Error: {e}"),
            },
            "status" => match args {
                [id, status] => match set_status(&mut state, id, status) {
                    Ok(()) => println!("Status updated."),
                    Err(e) => println!("Error: {e}"),
                },
                _ => println!("Usage: status <id> <scheduled|completed|cancelled>"),
            },
            "filter" => match args {
                ["show"] => print_filter(&state.filter),
                ["clear"] => {
                    state.filter = SessionFilter::default();
                    println!("Filter cleared.");
                }
                [field, rest @ ..] if !rest.is_empty() => {
                    match apply_filter_command(&mut state, field, &rest.join(" ")) {
                        Ok(()) => print_filter(&state.filter),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: filter child|subject|status|search|from|to <value>"),
            },
            "summary" => {
                let now = state.now();
                let summary = SessionSummary::from_sessions(&state.sessions, now);
                println!("Summary: {}", summary.to_cli_summary());
            }
            "errors" => {
                let projection = SessionProjector::new().project(&state.sessions, &state.filter);
                if projection.errors.is_empty() {
                    println!("No invalid sessions.");
                }
                for err in projection.errors {
                    println!("  {err}");
                }
            }
            "config" => match args {
                ["show"] => print_config(&state.config),
                ["load", path] => match load_config_from_json(path) {
                    Ok(config) => {
                        state.set_config(config);
                        println!("Config loaded from {path}.");
                    }
                    Err(e) => println!("Error loading config: {e}"),
                },
                ["save", path] => match save_config_to_json(&state.config, path) {
                    Ok(()) => println!("Config saved to {path}."),
                    Err(e) => println!("Error saving config: {e}"),
                },
                _ => println!("Usage: config show|load <json_path>|save <json_path>"),
            },
            "save" => match args {
                ["json", path] => {
                    let snapshot =
                        SessionSnapshot::new(state.sessions.clone(), Some(state.config.clone()));
                    match save_snapshot_to_json(&snapshot, path) {
                        Ok(()) => println!("Sessions saved to {path}."),
                        Err(e) => println!("Error saving sessions: {e}"),
                    }
                }
                ["csv", path] => match save_sessions_to_csv(&state.sessions, path) {
                    Ok(()) => println!("Sessions saved to {path}."),
                    Err(e) => println!("Error saving sessions: {e}"),
                },
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "load" => match args {
                ["json", path] => match load_snapshot_from_json(path) {
                    Ok(snapshot) => {
                        state.sessions = snapshot.sessions;
                        if let Some(config) = snapshot.config {
                            state.set_config(config);
                        }
                        println!("Sessions loaded from {path}.");
                    }
                    Err(e) => println!("Error loading sessions: {e}"),
                },
                ["csv", path] => match load_sessions_from_csv(path) {
                    Ok(sessions) => {
                        state.sessions = sessions;
                        println!("Sessions loaded from {path}.");
                    }
                    Err(e) => println!("Error loading sessions: {e}"),
                },
                _ => println!("Usage: load <json|csv> <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
