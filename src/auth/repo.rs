use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account record backing the bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 hash, never returned to clients
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<User>;
}
