use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

use super::{
    aggregate::DailySummary,
    day::parse_calendar_date,
    dto::{DateQuery, LogEntry, LogEntryInput, MessageResponse},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/log/date", get(list_logs_by_date))
        .route("/log/summary", get(daily_summary))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/log", post(create_log))
        .route("/log/:id", delete(delete_log))
}

fn required_date(q: DateQuery) -> Result<Date, AppError> {
    let raw = q.date.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(AppError::BadRequest("Date query parameter is required".into()));
    }
    parse_calendar_date(&raw).map_err(|e| {
        warn!(date = %raw, error = %e, "invalid date");
        AppError::BadRequest("Date must be formatted as YYYY-MM-DD".into())
    })
}

/// POST /log
#[instrument(skip(state, body))]
pub async fn create_log(
    State(state): State<AppState>,
    body: Result<Json<LogEntryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<LogEntry>), AppError> {
    let Json(input) = body.map_err(|e| {
        warn!(error = %e, "rejected log body");
        AppError::BadRequest(e.body_text())
    })?;

    let entry = state.store()?.insert(input).await?;
    info!(id = %entry.id, food = %entry.food_name, meal = %entry.meal_type, "food logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /log/date?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn list_logs_by_date(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<LogEntry>>, AppError> {
    let date = required_date(q)?;
    let logs = state.store()?.find_by_date(date).await?;
    Ok(Json(logs))
}

/// GET /log/summary?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<DailySummary>, AppError> {
    let date = required_date(q)?;
    let logs = state.store()?.find_by_date(date).await?;
    Ok(Json(DailySummary::for_day(date, &logs)))
}

/// DELETE /log/:id
///
/// A malformed id is reported the same way as an unknown one.
#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        warn!(%id, "malformed log id");
        return Err(AppError::NotFound("Log not found".into()));
    };

    state.store()?.delete_by_id(id).await?;
    info!(%id, "food log deleted");
    Ok(Json(MessageResponse {
        msg: "Log deleted successfully".into(),
    }))
}
