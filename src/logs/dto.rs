use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    calendar::day_key,
    nutrition::Macros,
    planner::Meal,
};

#[derive(Debug, Deserialize)]
pub struct LogFoodRequest {
    pub food_id: Uuid,
    pub meal_type: String,
    pub amount_grams: f64,
    /// Defaults to today.
    #[serde(default, with = "day_key::option")]
    pub logged_at: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default, with = "day_key::option")]
    pub date: Option<Date>,
    #[serde(default, with = "day_key::option")]
    pub start: Option<Date>,
    #[serde(default, with = "day_key::option")]
    pub end: Option<Date>,
}

/// A log with its computed macros, as shown under a meal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedPortion {
    pub log_id: Uuid,
    pub food_id: Uuid,
    pub name: String,
    pub amount_grams: f64,
    #[serde(flatten)]
    pub macros: Macros,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSummary {
    #[serde(flatten)]
    pub meal: Meal,
    pub items: Vec<LoggedPortion>,
    pub totals: Macros,
}
