use async_trait::async_trait;
use uuid::Uuid;

use super::model::PlannerState;

/// Persistence for the per-user planner document (templates, days, selected
/// date). The document is loaded and saved whole.
#[async_trait]
pub trait PlannerStore: Send + Sync {
    /// Returns an empty state for users that never saved one.
    async fn load_planner(&self, user_id: Uuid) -> anyhow::Result<PlannerState>;
    async fn save_planner(&self, user_id: Uuid, state: &PlannerState) -> anyhow::Result<()>;
}
