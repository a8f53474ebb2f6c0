use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{LogWeightRequest, WeightQuery},
    repo::WeightEntry,
    services,
};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/weight", get(weight_history).put(log_weight))
        .route("/weight/today", get(today_weight))
}

#[instrument(skip(state))]
pub async fn weight_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeightQuery>,
) -> Result<Json<Vec<WeightEntry>>, AppError> {
    Ok(Json(state.weights.weight_history(user_id, q.start, q.end).await?))
}

/// `null` when nothing was logged today.
#[instrument(skip(state))]
pub async fn today_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Option<WeightEntry>>, AppError> {
    Ok(Json(services::today_weight(&state, user_id).await?))
}

#[instrument(skip(state))]
pub async fn log_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogWeightRequest>,
) -> Result<Json<WeightEntry>, AppError> {
    Ok(Json(services::log_weight(&state, user_id, body).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use uuid::Uuid;

    #[tokio::test]
    async fn history_respects_bounds() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        for (day, w) in [(date!(2024 - 06 - 01), 83.0), (date!(2024 - 06 - 10), 82.0), (date!(2024 - 06 - 15), 81.0)] {
            state.weights.upsert_weight(me, day, w).await.unwrap();
        }
        let Json(all) = weight_history(State(state.clone()), AuthUser(me), Query(WeightQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let Json(some) = weight_history(
            State(state),
            AuthUser(me),
            Query(WeightQuery {
                start: Some(date!(2024 - 06 - 05)),
                end: None,
            }),
        )
        .await
        .unwrap();
        let weights: Vec<f64> = some.iter().map(|e| e.weight).collect();
        assert_eq!(weights, [82.0, 81.0]);
    }

    #[tokio::test]
    async fn today_is_null_when_missing() {
        let Json(entry) = today_weight(State(AppState::fake()), AuthUser(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(entry.is_none());
    }
}
