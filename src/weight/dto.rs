use serde::Deserialize;
use time::Date;

use crate::calendar::day_key;

#[derive(Debug, Deserialize)]
pub struct LogWeightRequest {
    pub weight: f64,
    /// Defaults to today.
    #[serde(default, with = "day_key::option")]
    pub date: Option<Date>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeightQuery {
    #[serde(default, with = "day_key::option")]
    pub start: Option<Date>,
    #[serde(default, with = "day_key::option")]
    pub end: Option<Date>,
}
