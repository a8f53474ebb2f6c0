//! Templates, per-day goals and meals, and the resolution of "today".

pub mod dto;
pub mod handlers;
mod machine;
pub mod model;
pub mod repo;
pub mod services;

pub use model::{DayData, Effect, Meal, MealBlueprint, PlannerError, PlannerState, Template};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
