use time::Date;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    dto::DayView,
    model::{DayData, Effect, PlannerError, PlannerState},
};
use crate::{
    calendar::is_today,
    error::AppError,
    logs::services::{logs_total, meal_breakdown},
    state::AppState,
};

/// Only today can be mutated.
pub fn ensure_editable(date: Date, today: Date) -> Result<(), AppError> {
    if !is_today(date, today) {
        return Err(AppError::InvalidDate(date));
    }
    Ok(())
}

pub async fn load(st: &AppState, user_id: Uuid) -> Result<PlannerState, AppError> {
    Ok(st.planner.load_planner(user_id).await?)
}

async fn run_effect(st: &AppState, user_id: Uuid, effect: Effect) -> Result<(), AppError> {
    match effect {
        Effect::ClearLogs(date) => {
            let cleared = st.logs.clear_logs_for_date(user_id, date).await?;
            info!(%user_id, %date, cleared, "logs cleared for template switch");
        }
    }
    Ok(())
}

/// Load, transition, carry out effects, save. On a transition error nothing
/// is written.
pub async fn mutate<R, F>(st: &AppState, user_id: Uuid, f: F) -> Result<R, AppError>
where
    F: FnOnce(&mut PlannerState) -> Result<(R, Option<Effect>), PlannerError> + Send,
    R: Send,
{
    let mut state = load(st, user_id).await?;
    let (out, effect) = f(&mut state)?;
    if let Some(effect) = effect {
        run_effect(st, user_id, effect).await?;
    }
    st.planner.save_planner(user_id, &state).await?;
    Ok(out)
}

/// [`mutate`] for transitions scoped to one date, which must be today.
pub async fn mutate_day<R, F>(st: &AppState, user_id: Uuid, date: Date, f: F) -> Result<R, AppError>
where
    F: FnOnce(&mut PlannerState) -> Result<R, PlannerError> + Send,
    R: Send,
{
    ensure_editable(date, st.today())?;
    mutate(st, user_id, |s| f(s).map(|out| (out, None))).await
}

fn day_of(state: &PlannerState, date: Date) -> Result<DayData, PlannerError> {
    state.day(date).cloned().ok_or(PlannerError::DayNotFound(date))
}

pub async fn apply_template(
    st: &AppState,
    user_id: Uuid,
    date: Date,
    template_id: Uuid,
) -> Result<DayData, AppError> {
    ensure_editable(date, st.today())?;
    let day = mutate(st, user_id, |s| {
        let template = s
            .template(template_id)
            .cloned()
            .ok_or(PlannerError::TemplateNotFound(template_id))?;
        let effect = s.apply_template(date, &template);
        Ok((day_of(s, date)?, Some(effect)))
    })
    .await?;
    info!(%user_id, %date, %template_id, "template applied");
    Ok(day)
}

pub async fn resolve_date(st: &AppState, user_id: Uuid, date: Date) -> Result<DayData, AppError> {
    ensure_editable(date, st.today())?;
    let day = mutate(st, user_id, |s| {
        let effect = s.resolve(date);
        Ok((day_of(s, date)?, effect))
    })
    .await?;
    info!(%user_id, %date, "day resolved");
    Ok(day)
}

pub async fn skip_template_selection(st: &AppState, user_id: Uuid, date: Date) -> Result<DayData, AppError> {
    mutate_day(st, user_id, date, |s| {
        s.skip_template_selection(date);
        day_of(s, date)
    })
    .await
}

pub async fn initialize_day(st: &AppState, user_id: Uuid, date: Date) -> Result<bool, AppError> {
    mutate_day(st, user_id, date, |s| Ok(s.initialize_day_without_template(date))).await
}

/// Future dates leave the selection as it was and nothing is written.
pub async fn select_date(st: &AppState, user_id: Uuid, date: Date) -> Result<(Option<Date>, bool), AppError> {
    let mut state = load(st, user_id).await?;
    let changed = state.select_date(date, st.today());
    if changed {
        st.planner.save_planner(user_id, &state).await?;
    }
    Ok((state.selected_date, changed))
}

/// Day screen for `date`. Reading an unresolved today resolves it first
/// when `auto_resolve_today` is on. That path never clears logs: a missing
/// day is built from the default template (or the fallback) and an
/// existing one keeps its meals.
pub async fn day_view(st: &AppState, user_id: Uuid, date: Date) -> Result<DayView, AppError> {
    let today = st.today();
    let mut state = load(st, user_id).await?;
    if st.config.auto_resolve_today && is_today(date, today) && state.needs_template_selection(date) {
        debug!(%user_id, %date, "auto-resolving today");
        state.skip_template_selection(date);
        st.planner.save_planner(user_id, &state).await?;
    }

    let logs = st.logs.logs_for_date(user_id, date).await?;
    let day = state.day(date);
    Ok(DayView {
        date,
        editable: is_today(date, today),
        needs_template_selection: state.needs_template_selection(date),
        daily_goals: day.map(|d| d.daily_goals),
        meals: day.map(|d| meal_breakdown(&d.meals, &logs)).unwrap_or_default(),
        totals: logs_total(&logs),
    })
}
