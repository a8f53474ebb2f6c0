//! Embedded single-file store.
//!
//! The whole dataset is one JSON document tagged with
//! [`STORAGE_VERSION`]. Every write works on a copy, persists it
//! (temp file + rename) and only then replaces the in-memory snapshot, so a
//! failed write leaves the previous state in place.

use std::{collections::HashMap, path::PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::repo::{User, UserStore},
    foods::repo::{Food, FoodStore, NewFood},
    logs::repo::{FoodLog, FoodLogStore, FoodLogWithFood, LoggedFood, NewFoodLog},
    planner::{model::STORAGE_VERSION, repo::PlannerStore, PlannerState},
    weight::repo::{WeightEntry, WeightStore},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WeightRow {
    user_id: Uuid,
    #[serde(flatten)]
    entry: WeightEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    version: String,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    foods: Vec<Food>,
    #[serde(default)]
    logs: Vec<FoodLog>,
    #[serde(default)]
    weights: Vec<WeightRow>,
    #[serde(default)]
    planners: HashMap<Uuid, PlannerState>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            version: STORAGE_VERSION.to_string(),
            users: Vec::new(),
            foods: Vec::new(),
            logs: Vec::new(),
            weights: Vec::new(),
            planners: HashMap::new(),
        }
    }

    fn join(&self, log: &FoodLog) -> FoodLogWithFood {
        let food = self
            .foods
            .iter()
            .find(|f| f.id == log.food_id && f.user_id == log.user_id)
            .map(|f| LoggedFood {
                id: f.id,
                name: f.name.clone(),
                profile: f.profile,
            });
        FoodLogWithFood {
            id: log.id,
            food_id: log.food_id,
            meal_type: log.meal_type.clone(),
            amount_grams: log.amount_grams,
            logged_at: log.logged_at,
            food,
        }
    }
}

pub struct LocalStore {
    path: Option<PathBuf>,
    inner: Mutex<Snapshot>,
}

impl LocalStore {
    /// Non-persistent store, used by tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Mutex::new(Snapshot::empty()),
        }
    }

    pub async fn open(path: PathBuf) -> anyhow::Result<Self> {
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snap: Snapshot = serde_json::from_slice(&bytes)
                    .with_context(|| format!("parse local store {}", path.display()))?;
                anyhow::ensure!(
                    snap.version == STORAGE_VERSION,
                    "local store {} has version {:?}, expected {:?}",
                    path.display(),
                    snap.version,
                    STORAGE_VERSION
                );
                snap
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::empty(),
            Err(e) => {
                return Err(e).with_context(|| format!("read local store {}", path.display()))
            }
        };
        Ok(Self {
            path: Some(path),
            inner: Mutex::new(snapshot),
        })
    }

    async fn persist(&self, snap: &Snapshot) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = serde_json::to_vec_pretty(snap).context("serialize local store")?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("rename into {}", path.display()))?;
        debug!(path = %path.display(), "local store persisted");
        Ok(())
    }

    async fn write<R: Send>(&self, f: impl FnOnce(&mut Snapshot) -> R + Send) -> anyhow::Result<R> {
        let mut guard = self.inner.lock().await;
        let mut next = guard.clone();
        let out = f(&mut next);
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl UserStore for LocalStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let snap = self.inner.lock().await;
        Ok(snap.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let snap = self.inner.lock().await;
        Ok(snap.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> anyhow::Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        let created = user.clone();
        self.write(move |snap| {
            anyhow::ensure!(
                snap.users.iter().all(|u| u.email != created.email),
                "duplicate email"
            );
            snap.users.push(created);
            Ok(())
        })
        .await??;
        Ok(user)
    }
}

#[async_trait]
impl FoodStore for LocalStore {
    async fn list_foods(&self, user_id: Uuid) -> anyhow::Result<Vec<Food>> {
        let snap = self.inner.lock().await;
        Ok(snap
            .foods
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_food(&self, user_id: Uuid, food: NewFood) -> anyhow::Result<Food> {
        let row = Food {
            id: Uuid::new_v4(),
            user_id,
            name: food.name,
            profile: food.profile,
            created_at: OffsetDateTime::now_utc(),
        };
        let stored = row.clone();
        self.write(move |snap| snap.foods.push(stored)).await?;
        Ok(row)
    }

    async fn update_food(&self, user_id: Uuid, id: Uuid, food: NewFood) -> anyhow::Result<Option<Food>> {
        self.write(move |snap| {
            let row = snap
                .foods
                .iter_mut()
                .find(|f| f.id == id && f.user_id == user_id)?;
            row.name = food.name;
            row.profile = food.profile;
            Some(row.clone())
        })
        .await
    }

    async fn delete_food(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        self.write(move |snap| {
            let before = snap.foods.len();
            snap.foods.retain(|f| !(f.id == id && f.user_id == user_id));
            snap.foods.len() != before
        })
        .await
    }
}

#[async_trait]
impl FoodLogStore for LocalStore {
    async fn insert_log(&self, user_id: Uuid, log: NewFoodLog) -> anyhow::Result<FoodLog> {
        let row = FoodLog {
            id: Uuid::new_v4(),
            user_id,
            food_id: log.food_id,
            meal_type: log.meal_type,
            amount_grams: log.amount_grams,
            logged_at: log.logged_at,
            created_at: OffsetDateTime::now_utc(),
        };
        let stored = row.clone();
        self.write(move |snap| snap.logs.push(stored)).await?;
        Ok(row)
    }

    async fn logs_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLogWithFood>> {
        let snap = self.inner.lock().await;
        Ok(snap
            .logs
            .iter()
            .filter(|l| l.user_id == user_id && l.logged_at == date)
            .map(|l| snap.join(l))
            .collect())
    }

    async fn logs_for_range(&self, user_id: Uuid, start: Date, end: Date) -> anyhow::Result<Vec<FoodLogWithFood>> {
        let snap = self.inner.lock().await;
        let mut rows: Vec<_> = snap
            .logs
            .iter()
            .filter(|l| l.user_id == user_id && l.logged_at >= start && l.logged_at <= end)
            .map(|l| snap.join(l))
            .collect();
        rows.sort_by_key(|r| r.logged_at);
        Ok(rows)
    }

    async fn delete_log(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        self.write(move |snap| {
            let before = snap.logs.len();
            snap.logs.retain(|l| !(l.id == id && l.user_id == user_id));
            snap.logs.len() != before
        })
        .await
    }

    async fn clear_logs_for_date(&self, user_id: Uuid, date: Date) -> anyhow::Result<u64> {
        self.write(move |snap| {
            let before = snap.logs.len();
            snap.logs.retain(|l| !(l.user_id == user_id && l.logged_at == date));
            (before - snap.logs.len()) as u64
        })
        .await
    }
}

#[async_trait]
impl WeightStore for LocalStore {
    async fn upsert_weight(&self, user_id: Uuid, date: Date, weight: f64) -> anyhow::Result<WeightEntry> {
        self.write(move |snap| {
            match snap
                .weights
                .iter_mut()
                .find(|w| w.user_id == user_id && w.entry.logged_at == date)
            {
                Some(row) => {
                    row.entry.weight = weight;
                    row.entry.clone()
                }
                None => {
                    let entry = WeightEntry {
                        id: Uuid::new_v4(),
                        weight,
                        logged_at: date,
                    };
                    snap.weights.push(WeightRow {
                        user_id,
                        entry: entry.clone(),
                    });
                    entry
                }
            }
        })
        .await
    }

    async fn weight_history(
        &self,
        user_id: Uuid,
        start: Option<Date>,
        end: Option<Date>,
    ) -> anyhow::Result<Vec<WeightEntry>> {
        let snap = self.inner.lock().await;
        let mut rows: Vec<_> = snap
            .weights
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter(|w| start.map_or(true, |s| w.entry.logged_at >= s))
            .filter(|w| end.map_or(true, |e| w.entry.logged_at <= e))
            .map(|w| w.entry.clone())
            .collect();
        rows.sort_by_key(|w| w.logged_at);
        Ok(rows)
    }

    async fn weight_on(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<WeightEntry>> {
        let snap = self.inner.lock().await;
        Ok(snap
            .weights
            .iter()
            .find(|w| w.user_id == user_id && w.entry.logged_at == date)
            .map(|w| w.entry.clone()))
    }
}

#[async_trait]
impl PlannerStore for LocalStore {
    async fn load_planner(&self, user_id: Uuid) -> anyhow::Result<PlannerState> {
        let snap = self.inner.lock().await;
        Ok(snap.planners.get(&user_id).cloned().unwrap_or_default())
    }

    async fn save_planner(&self, user_id: Uuid, state: &PlannerState) -> anyhow::Result<()> {
        let state = state.clone();
        self.write(move |snap| {
            snap.planners.insert(user_id, state);
        })
        .await
    }
}
