use serde::{Deserialize, Serialize};
use time::Date;

use super::services::Period;
use crate::{calendar::day_key, nutrition::Macros, weight::repo::WeightEntry};

/// `period` picks a preset window; `start`/`end` override it.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default, with = "day_key::option")]
    pub start: Option<Date>,
    #[serde(default, with = "day_key::option")]
    pub end: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    #[serde(with = "day_key")]
    pub date: Date,
    #[serde(flatten)]
    pub totals: Macros,
}

#[derive(Debug, Serialize)]
pub struct HistoryReport {
    #[serde(with = "day_key")]
    pub start: Date,
    #[serde(with = "day_key")]
    pub end: Date,
    pub days: Vec<DailyTotal>,
    pub averages: Macros,
    pub days_tracked: usize,
    pub weights: Vec<WeightEntry>,
    pub today_weight: Option<WeightEntry>,
}
