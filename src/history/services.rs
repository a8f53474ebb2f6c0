use serde::Deserialize;
use time::{macros::date, Date, Duration};
use tracing::debug;
use uuid::Uuid;

use super::dto::{DailyTotal, HistoryQuery, HistoryReport};
use crate::{
    error::AppError, logs::services::daily_totals, nutrition::Macros, state::AppState,
};

/// Start of the "all" window.
pub const HISTORY_EPOCH: Date = date!(2020 - 01 - 01);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl Period {
    pub fn start(self, today: Date) -> Date {
        match self {
            Period::Week => today - Duration::days(7),
            Period::Month => today - Duration::days(30),
            // Feb 29 has no counterpart a year back.
            Period::Year => today
                .replace_year(today.year() - 1)
                .unwrap_or(today - Duration::days(365)),
            Period::All => HISTORY_EPOCH,
        }
    }
}

/// Averages over the dates that have at least one resolvable log, rounded
/// to whole numbers.
pub fn averages(days: &[DailyTotal]) -> Macros {
    let mut sum = Macros::default();
    for d in days {
        sum.add(&d.totals);
    }
    let n = days.len().max(1) as f64;
    Macros {
        protein: (sum.protein / n).round(),
        carbs: (sum.carbs / n).round(),
        fat: (sum.fat / n).round(),
        calories: (sum.calories / n).round(),
    }
}

pub async fn report(st: &AppState, user_id: Uuid, q: HistoryQuery) -> Result<HistoryReport, AppError> {
    let today = st.today();
    let start = q.start.unwrap_or_else(|| q.period.unwrap_or_default().start(today));
    let end = q.end.unwrap_or(today);
    if start > end {
        return Err(AppError::BadRequest("start must not be after end".into()));
    }

    let logs = st.logs.logs_for_range(user_id, start, end).await?;
    let days: Vec<DailyTotal> = daily_totals(&logs)
        .into_iter()
        .map(|(date, totals)| DailyTotal { date, totals })
        .collect();
    let weights = st.weights.weight_history(user_id, Some(start), Some(end)).await?;
    let today_weight = st.weights.weight_on(user_id, today).await?;
    debug!(%user_id, %start, %end, logs = logs.len(), days = days.len(), "history built");

    Ok(HistoryReport {
        start,
        end,
        averages: averages(&days),
        days_tracked: days.len(),
        days,
        weights,
        today_weight,
    })
}
