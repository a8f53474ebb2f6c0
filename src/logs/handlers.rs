use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    dto::{LogFoodRequest, LogQuery},
    repo::{FoodLog, FoodLogWithFood},
    services,
};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs).post(create_log))
        .route("/logs/:id", delete(delete_log))
}

/// `?date=` for one day or `?start=&end=` for an inclusive range.
#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<LogQuery>,
) -> Result<Json<Vec<FoodLogWithFood>>, AppError> {
    let logs = match (q.date, q.start, q.end) {
        (Some(date), _, _) => state.logs.logs_for_date(user_id, date).await?,
        (None, Some(start), Some(end)) => {
            if start > end {
                return Err(AppError::BadRequest("start must not be after end".into()));
            }
            state.logs.logs_for_range(user_id, start, end).await?
        }
        _ => return Err(AppError::BadRequest("date or start and end required".into())),
    };
    Ok(Json(logs))
}

#[instrument(skip(state, body))]
pub async fn create_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogFoodRequest>,
) -> Result<(StatusCode, Json<FoodLog>), AppError> {
    let log = services::log_food(&state, user_id, body).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// Deleting an unknown id still answers 204.
#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let removed = state.logs.delete_log(user_id, id).await?;
    debug!(%user_id, log_id = %id, removed, "delete food log");
    Ok(StatusCode::NO_CONTENT)
}
