use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::repo::{User, UserStore},
    foods::repo::{Food, FoodStore, NewFood},
    logs::repo::{FoodLog, FoodLogStore, FoodLogWithFood, LoggedFood, NewFoodLog},
    nutrition::NutrientProfile,
    planner::{model::STORAGE_VERSION, repo::PlannerStore, PlannerState},
    weight::repo::{WeightEntry, WeightStore},
};

/// Remote relational backend. Ownership is enforced by filtering every
/// statement on `user_id`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        } else {
            info!("migrations applied");
        }

        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct LogJoinRow {
    id: Uuid,
    food_id: Uuid,
    meal_type: String,
    amount_grams: f64,
    logged_at: Date,
    food_name: Option<String>,
    protein_per_100g: Option<f64>,
    carbs_per_100g: Option<f64>,
    fat_per_100g: Option<f64>,
    calories_per_100g: Option<f64>,
}

impl From<LogJoinRow> for FoodLogWithFood {
    fn from(r: LogJoinRow) -> Self {
        let food = match (
            r.food_name,
            r.protein_per_100g,
            r.carbs_per_100g,
            r.fat_per_100g,
            r.calories_per_100g,
        ) {
            (Some(name), Some(p), Some(c), Some(f), Some(kcal)) => Some(LoggedFood {
                id: r.food_id,
                name,
                profile: NutrientProfile {
                    protein_per_100g: p,
                    carbs_per_100g: c,
                    fat_per_100g: f,
                    calories_per_100g: kcal,
                },
            }),
            _ => None,
        };
        Self {
            id: r.id,
            food_id: r.food_id,
            meal_type: r.meal_type,
            amount_grams: r.amount_grams,
            logged_at: r.logged_at,
            food,
        }
    }
}

const LOG_JOIN_SELECT: &str = r#"
    SELECT l.id, l.food_id, l.meal_type, l.amount_grams, l.logged_at,
           f.name AS food_name, f.protein_per_100g, f.carbs_per_100g,
           f.fat_per_100g, f.calories_per_100g
      FROM daily_logs l
      LEFT JOIN foods_library f ON f.id = l.food_id AND f.user_id = l.user_id
"#;

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, email, password_hash, created_at FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .context("create user")?;
        Ok(user)
    }
}

#[async_trait]
impl FoodStore for PgStore {
    async fn list_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<Food>> {
        let rows = sqlx::query_as::<_, Food>(
            r#"
            SELECT id, user_id, name, protein_per_100g, carbs_per_100g,
                   fat_per_100g, calories_per_100g, created_at
            FROM foods_library
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list foods")?;
        Ok(rows)
    }

    async fn create_food(&self, user_id: Uuid, food: NewFood) -> anyhow::Result<Food> {
        let row = sqlx::query_as::<_, Food>(
            r#"
            INSERT INTO foods_library
                (id, user_id, name, protein_per_100g, carbs_per_100g, fat_per_100g, calories_per_100g)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, protein_per_100g, carbs_per_100g,
                      fat_per_100g, calories_per_100g, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&food.name)
        .bind(food.profile.protein_per_100g)
        .bind(food.profile.carbs_per_100g)
        .bind(food.profile.fat_per_100g)
        .bind(food.profile.calories_per_100g)
        .fetch_one(&self.db)
        .await
        .context("insert food")?;
        Ok(row)
    }

    async fn update_food(&self, user_id: Uuid, id: Uuid, food: NewFood) -> anyhow::Result<Option<Food>> {
        let row = sqlx::query_as::<_, Food>(
            r#"
            UPDATE foods_library
               SET name = $3, protein_per_100g = $4, carbs_per_100g = $5,
                   fat_per_100g = $6, calories_per_100g = $7
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, protein_per_100g, carbs_per_100g,
                      fat_per_100g, calories_per_100g, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&food.name)
        .bind(food.profile.protein_per_100g)
        .bind(food.profile.carbs_per_100g)
        .bind(food.profile.fat_per_100g)
        .bind(food.profile.calories_per_100g)
        .fetch_optional(&self.db)
        .await
        .context("update food")?;
        Ok(row)
    }

    async fn delete_food(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM foods_library WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete food")?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl FoodLogStore for PgStore {
    async fn insert_log(&self, user_id: Uuid, log: NewFoodLog) -> anyhow::Result<FoodLog> {
        let row = sqlx::query_as::<_, FoodLog>(
            r#"
            INSERT INTO daily_logs (id, user_id, food_id, meal_type, amount_grams, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, food_id, meal_type, amount_grams, logged_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(log.food_id)
        .bind(&log.meal_type)
        .bind(log.amount_grams)
        .bind(log.logged_at)
        .fetch_one(&self.db)
        .await
        .context("insert food log")?;
        Ok(row)
    }

    async fn logs_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLogWithFood>> {
        let sql = format!(
            "{LOG_JOIN_SELECT} WHERE l.user_id = $1 AND l.logged_at = $2 ORDER BY l.created_at ASC"
        );
        let rows = sqlx::query_as::<_, LogJoinRow>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_all(&self.db)
            .await
            .context("logs for date")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn logs_for_range(&self, user_id: Uuid, start: Date, end: Date) -> anyhow::Result<Vec<FoodLogWithFood>> {
        let sql = format!(
            "{LOG_JOIN_SELECT} WHERE l.user_id = $1 AND l.logged_at >= $2 AND l.logged_at <= $3 \
             ORDER BY l.logged_at ASC, l.created_at ASC"
        );
        let rows = sqlx::query_as::<_, LogJoinRow>(&sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.db)
            .await
            .context("logs for range")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_log(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM daily_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete food log")?;
        Ok(res.rows_affected() > 0)
    }

    async fn clear_logs_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM daily_logs WHERE user_id = $1 AND logged_at = $2")
            .bind(user_id)
            .bind(date)
            .execute(&self.db)
            .await
            .context("clear logs for date")?;
        Ok(res.rows_affected())
    }
}

#[async_trait]
impl WeightStore for PgStore {
    async fn upsert_weight(&self, user_id: Uuid, date: Date, weight: f64) -> anyhow::Result<WeightEntry> {
        let row = sqlx::query_as::<_, WeightEntry>(
            r#"
            INSERT INTO weight_history (id, user_id, weight, logged_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, logged_at) DO UPDATE SET weight = EXCLUDED.weight
            RETURNING id, weight, logged_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(weight)
        .bind(date)
        .fetch_one(&self.db)
        .await
        .context("upsert weight")?;
        Ok(row)
    }

    async fn weight_history(
        &self,
        user_id: Uuid,
        start: Option<Date>,
        end: Option<Date>,
    ) -> anyhow::Result<Vec<WeightEntry>> {
        let rows = sqlx::query_as::<_, WeightEntry>(
            r#"
            SELECT id, weight, logged_at
              FROM weight_history
             WHERE user_id = $1
               AND ($2::date IS NULL OR logged_at >= $2)
               AND ($3::date IS NULL OR logged_at <= $3)
             ORDER BY logged_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await
        .context("weight history")?;
        Ok(rows)
    }

    async fn weight_on(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<WeightEntry>> {
        let row = sqlx::query_as::<_, WeightEntry>(
            r#"SELECT id, weight, logged_at FROM weight_history WHERE user_id = $1 AND logged_at = $2"#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await
        .context("weight on date")?;
        Ok(row)
    }
}

#[async_trait]
impl PlannerStore for PgStore {
    async fn load_planner(&self, user_id: Uuid) -> anyhow::Result<PlannerState> {
        let row = sqlx::query_as::<_, (String, Json<PlannerState>)>(
            r#"SELECT version, state FROM planner_state WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("load planner state")?;

        match row {
            None => Ok(PlannerState::default()),
            Some((version, Json(state))) => {
                anyhow::ensure!(
                    version == STORAGE_VERSION,
                    "planner state has version {version:?}, expected {STORAGE_VERSION:?}"
                );
                Ok(state)
            }
        }
    }

    async fn save_planner(&self, user_id: Uuid, state: &PlannerState) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO planner_state (user_id, version, state, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id) DO UPDATE
               SET version = EXCLUDED.version, state = EXCLUDED.state, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(STORAGE_VERSION)
        .bind(Json(state))
        .execute(&self.db)
        .await
        .context("save planner state")?;
        Ok(())
    }
}
