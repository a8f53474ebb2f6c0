use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::NutrientProfile;

/// A reusable food in a user's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: NutrientProfile,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewFood {
    pub name: String,
    #[serde(flatten)]
    pub profile: NutrientProfile,
}

#[async_trait]
pub trait FoodStore: Send + Sync {
    /// Newest first.
    async fn list_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<Food>>;
    async fn create_food(&self, user_id: Uuid, food: NewFood) -> anyhow::Result<Food>;
    async fn update_food(&self, user_id: Uuid, id: Uuid, food: NewFood) -> anyhow::Result<Option<Food>>;
    /// Does not touch logs referencing the food.
    async fn delete_food(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}
