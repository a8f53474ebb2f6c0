use crate::auth::{repo::UserStore, services::TokenIssuer};
use crate::calendar::{Clock, FixedClock, SystemClock};
use crate::config::{AppConfig, JwtConfig, StorageBackend};
use crate::foods::repo::FoodStore;
use crate::logs::repo::FoodLogStore;
use crate::planner::repo::PlannerStore;
use crate::store::{local::LocalStore, postgres::PgStore};
use crate::weight::repo::WeightStore;
use std::sync::Arc;
use time::UtcOffset;
use tracing::info;

/// Shared handles injected into every handler. All stores are trait
/// objects so either backend can sit behind them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub foods: Arc<dyn FoodStore>,
    pub logs: Arc<dyn FoodLogStore>,
    pub weights: Arc<dyn WeightStore>,
    pub planner: Arc<dyn PlannerStore>,
    pub clock: Arc<dyn Clock>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let clock = Arc::new(SystemClock::new(config.utc_offset)) as Arc<dyn Clock>;

        let state = match &config.storage {
            StorageBackend::Postgres { database_url } => {
                info!("using postgres storage");
                let store = Arc::new(PgStore::connect(database_url).await?);
                Self::with_store(config.clone(), store, clock)
            }
            StorageBackend::Local { path } => {
                info!(path = %path.display(), "using local storage");
                let store = Arc::new(LocalStore::open(path.clone()).await?);
                Self::with_store(config.clone(), store, clock)
            }
        };
        Ok(state)
    }

    /// Wires one backend into every port.
    pub fn with_store<T>(config: Arc<AppConfig>, store: Arc<T>, clock: Arc<dyn Clock>) -> Self
    where
        T: UserStore + FoodStore + FoodLogStore + WeightStore + PlannerStore + 'static,
    {
        Self {
            tokens: Arc::new(TokenIssuer::new(&config.jwt)),
            config,
            users: store.clone(),
            foods: store.clone(),
            logs: store.clone(),
            weights: store.clone(),
            planner: store,
            clock,
        }
    }

    pub fn today(&self) -> time::Date {
        self.clock.today()
    }

    /// In-memory store and a clock pinned to 2024-06-15.
    pub fn fake() -> Self {
        Self::fake_on(time::macros::date!(2024 - 06 - 15))
    }

    pub fn fake_on(today: time::Date) -> Self {
        let config = Arc::new(AppConfig {
            storage: StorageBackend::Local {
                path: "fityo-test.json".into(),
            },
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            utc_offset: UtcOffset::UTC,
            auto_resolve_today: true,
        });
        Self::with_store(
            config,
            Arc::new(LocalStore::in_memory()),
            Arc::new(FixedClock(today)),
        )
    }
}
