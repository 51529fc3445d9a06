use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    CalendarConfig, CalendarGridBuilder, GridProjection, ScheduleError, SessionFilter,
    SessionProjector, SessionRecord, SessionSummary, SlotRow, TimeSlot, ViewMode,
    generate_slots, generate_slots_for_config, slots::parse_time, validate_session,
};

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<RwLock<Vec<SessionRecord>>>,
    config: Arc<CalendarConfig>,
}

impl AppState {
    pub fn new(sessions: Vec<SessionRecord>, config: CalendarConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
            config: Arc::new(config),
        }
    }

    fn sessions(&self) -> Arc<RwLock<Vec<SessionRecord>>> {
        self.sessions.clone()
    }

    fn grid_builder(&self) -> Result<CalendarGridBuilder, ApiError> {
        CalendarGridBuilder::from_config(&self.config).map_err(ApiError::from)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CalendarParams {
    date: Option<NaiveDate>,
    view: Option<String>,
}

#[derive(Debug, Serialize)]
struct CalendarResponse {
    view: ViewMode,
    reference: NaiveDate,
    title: String,
    #[serde(flatten)]
    grid: GridProjection,
}

#[derive(Debug, Default, Deserialize)]
struct SlotParams {
    start: Option<String>,
    end: Option<String>,
    interval: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AgendaResponse {
    date: NaiveDate,
    rows: Vec<SlotRow>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/calendar", get(calendar))
        .route("/slots", get(slots))
        .route("/agenda", get(agenda))
        .route("/summary", get(summary))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    sessions: Vec<SessionRecord>,
    config: CalendarConfig,
) -> std::io::Result<()> {
    let state = AppState::new(sessions, config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "session calendar API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_sessions(
    State(state): State<AppState>,
    Query(filter): Query<SessionFilter>,
) -> Json<Vec<SessionRecord>> {
    let sessions = state.sessions();
    let matching = {
        let guard = sessions.read();
        guard
            .iter()
            .filter(|session| filter.matches(session))
            .cloned()
            .collect()
    };
    Json(matching)
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<Json<SessionRecord>, ApiError> {
    let sessions = state.sessions();
    let found = {
        let guard = sessions.read();
        guard.iter().find(|session| session.id == session_id).cloned()
    };
    found
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("session {session_id} not found")))
}

async fn create_session(
    State(state): State<AppState>,
    Json(session): Json<SessionRecord>,
) -> Result<(StatusCode, Json<SessionRecord>), ApiError> {
    validate_session(&session).map_err(|err| ApiError::invalid(err.to_string()))?;
    let sessions = state.sessions();
    {
        let mut guard = sessions.write();
        if guard.iter().any(|existing| existing.id == session.id) {
            return Err(ApiError::Conflict(format!(
                "session {} already exists",
                session.id
            )));
        }
        guard.push(session.clone());
    }
    info!(session_id = session.id, "session created");
    Ok((StatusCode::CREATED, Json(session)))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let sessions = state.sessions();
    let removed = {
        let mut guard = sessions.write();
        let before = guard.len();
        guard.retain(|session| session.id != session_id);
        guard.len() != before
    };
    if !removed {
        return Err(ApiError::not_found(format!("session {session_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
    Query(filter): Query<SessionFilter>,
) -> Result<Json<CalendarResponse>, ApiError> {
    let builder = state.grid_builder()?;
    let view = params
        .view
        .as_deref()
        .map(ViewMode::parse_or_default)
        .unwrap_or_default();
    let reference = params.date.unwrap_or_else(|| builder.today());
    let cells = builder.build_grid(reference, view);

    let sessions = state.sessions();
    let grid = {
        let guard = sessions.read();
        SessionProjector::new().project_grid(&cells, &guard, &filter)
    };
    Ok(Json(CalendarResponse {
        view,
        reference,
        title: builder.period_title(reference, view),
        grid,
    }))
}

async fn slots(
    State(state): State<AppState>,
    Query(params): Query<SlotParams>,
) -> Result<Json<Vec<TimeSlot>>, ApiError> {
    let start = match params.start.as_deref() {
        Some(value) => parse_time(value)?,
        None => state.config.day_start,
    };
    let end = match params.end.as_deref() {
        Some(value) => parse_time(value)?,
        None => state.config.day_end,
    };
    let interval = params.interval.unwrap_or(state.config.slot_interval_minutes);
    Ok(Json(generate_slots(start, end, interval)?))
}

async fn agenda(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
    Query(filter): Query<SessionFilter>,
) -> Result<Json<AgendaResponse>, ApiError> {
    let date = match params.date {
        Some(date) => date,
        None => state.grid_builder()?.today(),
    };
    let slots = generate_slots_for_config(&state.config)?;
    let sessions = state.sessions();
    let rows = {
        let guard = sessions.read();
        SessionProjector::new().project_slots(&guard, date, &slots, &filter)
    };
    Ok(Json(AgendaResponse { date, rows }))
}

async fn summary(State(state): State<AppState>) -> Result<Json<SessionSummary>, ApiError> {
    let tz = state.config.timezone()?;
    let now = Utc::now().with_timezone(&tz).naive_local();
    let sessions = state.sessions();
    let summary = {
        let guard = sessions.read();
        SessionSummary::from_sessions(&guard, now)
    };
    Ok(Json(summary))
}
