use std::collections::BTreeMap;

use time::Date;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::{LogFoodRequest, LoggedPortion, MealSummary},
    repo::{FoodLog, FoodLogWithFood, NewFoodLog},
};
use crate::{
    error::AppError,
    nutrition::{calculate_macros, Macros},
    planner::{services::ensure_editable, Meal},
    state::AppState,
};

/// Macros of one log; `None` when its food no longer exists.
pub fn portion(log: &FoodLogWithFood) -> Option<LoggedPortion> {
    let food = log.food.as_ref()?;
    Some(LoggedPortion {
        log_id: log.id,
        food_id: log.food_id,
        name: food.name.clone(),
        amount_grams: log.amount_grams,
        macros: calculate_macros(&food.profile, log.amount_grams),
    })
}

/// Groups logs under the meals whose name equals their `meal_type`,
/// ignoring case. Logs matching no meal are left out.
pub fn meal_breakdown(meals: &[Meal], logs: &[FoodLogWithFood]) -> Vec<MealSummary> {
    meals
        .iter()
        .map(|meal| {
            let items: Vec<LoggedPortion> = logs
                .iter()
                .filter(|log| meal.matches(&log.meal_type))
                .filter_map(portion)
                .collect();
            let totals = Macros::total(items.iter().map(|i| &i.macros));
            MealSummary {
                meal: meal.clone(),
                items,
                totals,
            }
        })
        .collect()
}

/// Totals over every resolvable log, whatever its meal.
pub fn logs_total(logs: &[FoodLogWithFood]) -> Macros {
    let portions: Vec<LoggedPortion> = logs.iter().filter_map(portion).collect();
    Macros::total(portions.iter().map(|p| &p.macros))
}

/// Per-date totals; dates with only dangling logs are absent.
pub fn daily_totals(logs: &[FoodLogWithFood]) -> BTreeMap<Date, Macros> {
    let mut by_date: BTreeMap<Date, Vec<Macros>> = BTreeMap::new();
    for log in logs {
        if let Some(p) = portion(log) {
            by_date.entry(log.logged_at).or_default().push(p.macros);
        }
    }
    by_date
        .into_iter()
        .map(|(date, items)| (date, Macros::total(items.iter())))
        .collect()
}

pub async fn log_food(st: &AppState, user_id: Uuid, req: LogFoodRequest) -> Result<FoodLog, AppError> {
    let today = st.today();
    let date = req.logged_at.unwrap_or(today);
    ensure_editable(date, today)?;

    let meal_type = req.meal_type.trim().to_string();
    if meal_type.is_empty() {
        return Err(AppError::BadRequest("meal_type must not be empty".into()));
    }
    if !req.amount_grams.is_finite() || req.amount_grams < 0.0 {
        return Err(AppError::BadRequest("amount_grams must be a non-negative number".into()));
    }

    let log = st
        .logs
        .insert_log(
            user_id,
            NewFoodLog {
                food_id: req.food_id,
                meal_type,
                amount_grams: req.amount_grams,
                logged_at: date,
            },
        )
        .await?;
    info!(%user_id, log_id = %log.id, meal_type = %log.meal_type, "food logged");
    Ok(log)
}
