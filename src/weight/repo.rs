use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

use crate::calendar::day_key;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WeightEntry {
    pub id: Uuid,
    pub weight: f64,
    #[serde(with = "day_key")]
    pub logged_at: Date,
}

#[async_trait]
pub trait WeightStore: Send + Sync {
    /// Insert or overwrite the entry keyed on (user, date).
    async fn upsert_weight(&self, user_id: Uuid, date: Date, weight: f64) -> anyhow::Result<WeightEntry>;
    /// Ascending by date; open bounds when `None`.
    async fn weight_history(
        &self,
        user_id: Uuid,
        start: Option<Date>,
        end: Option<Date>,
    ) -> anyhow::Result<Vec<WeightEntry>>;
    async fn weight_on(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<WeightEntry>>;
}
