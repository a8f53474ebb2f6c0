use tracing::info;
use uuid::Uuid;

use super::{dto::LogWeightRequest, repo::WeightEntry};
use crate::{calendar::is_future, error::AppError, state::AppState};

/// Upserts the weight for the given date (today when absent). Past dates
/// are allowed so missed days can be back-filled.
pub async fn log_weight(st: &AppState, user_id: Uuid, req: LogWeightRequest) -> Result<WeightEntry, AppError> {
    let today = st.today();
    let date = req.date.unwrap_or(today);
    if is_future(date, today) {
        return Err(AppError::InvalidDate(date));
    }
    if !req.weight.is_finite() || req.weight <= 0.0 {
        return Err(AppError::BadRequest("weight must be a positive number".into()));
    }
    let entry = st.weights.upsert_weight(user_id, date, req.weight).await?;
    info!(%user_id, %date, weight = entry.weight, "weight upserted");
    Ok(entry)
}

pub async fn today_weight(st: &AppState, user_id: Uuid) -> Result<Option<WeightEntry>, AppError> {
    Ok(st.weights.weight_on(user_id, st.today()).await?)
}
