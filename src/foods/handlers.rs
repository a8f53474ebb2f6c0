use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{FoodRequest, FoodResponse};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route("/foods/:id", put(update_food).delete(delete_food))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FoodResponse>>, AppError> {
    let foods = state.foods.list_foods(user_id).await?;
    Ok(Json(foods.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<FoodRequest>,
) -> Result<(StatusCode, Json<FoodResponse>), AppError> {
    let food = body.validate().map_err(AppError::BadRequest)?;
    let created = state.foods.create_food(user_id, food).await?;
    info!(%user_id, food_id = %created.id, "food created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FoodRequest>,
) -> Result<Json<FoodResponse>, AppError> {
    let food = body.validate().map_err(AppError::BadRequest)?;
    let updated = state
        .foods
        .update_food(user_id, id, food)
        .await?
        .ok_or(AppError::NotFound("Food"))?;
    Ok(Json(updated.into()))
}

/// Logs referencing the food are kept; they surface without a profile.
#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.foods.delete_food(user_id, id).await? {
        return Err(AppError::NotFound("Food"));
    }
    info!(%user_id, food_id = %id, "food deleted");
    Ok(StatusCode::NO_CONTENT)
}
