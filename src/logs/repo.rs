use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{calendar::day_key, nutrition::NutrientProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub meal_type: String,
    pub amount_grams: f64,
    #[serde(with = "day_key")]
    pub logged_at: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodLog {
    pub food_id: Uuid,
    pub meal_type: String,
    pub amount_grams: f64,
    pub logged_at: Date,
}

/// Profile snapshot joined onto a log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedFood {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub profile: NutrientProfile,
}

/// A log joined to its food. `food` is `None` when the food was deleted
/// after logging; such rows are kept so consumers decide how to skip them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodLogWithFood {
    pub id: Uuid,
    pub food_id: Uuid,
    pub meal_type: String,
    pub amount_grams: f64,
    #[serde(with = "day_key")]
    pub logged_at: Date,
    pub food: Option<LoggedFood>,
}

#[async_trait]
pub trait FoodLogStore: Send + Sync {
    async fn insert_log(&self, user_id: Uuid, log: NewFoodLog) -> anyhow::Result<FoodLog>;
    /// Ordered by creation time.
    async fn logs_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLogWithFood>>;
    /// Inclusive bounds, ordered by date.
    async fn logs_for_range(&self, user_id: Uuid, start: Date, end: Date) -> anyhow::Result<Vec<FoodLogWithFood>>;
    async fn delete_log(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn clear_logs_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<u64>;
}
