use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{HistoryQuery, HistoryReport},
    services,
};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/history", get(history))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<HistoryReport>, AppError> {
    Ok(Json(services::report(&state, user_id, q).await?))
}
