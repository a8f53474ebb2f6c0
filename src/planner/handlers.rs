use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        validate_blueprint, validate_draft, validate_meal_name, validate_patch, ApplyTemplateRequest,
        DayView, InitializeResponse, ReorderRequest, SelectDateRequest, SelectedDateResponse,
        UpdateMealRequest,
    },
    model::{DayData, Meal, MealBlueprint, Template, TemplateDraft, TemplatePatch},
    services,
};
use crate::{
    auth::AuthUser, calendar::parse_day, error::AppError, nutrition::MacroGoals, state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/:id", put(update_template).delete(delete_template))
        .route("/templates/:id/default", post(set_default_template))
        .route("/days/:date", get(get_day))
        .route("/days/:date/resolve", post(resolve_day))
        .route("/days/:date/template", post(apply_template))
        .route("/days/:date/skip", post(skip_template_selection))
        .route("/days/:date/initialize", post(initialize_day))
        .route("/days/:date/goals", put(set_day_goals))
        .route("/days/:date/meals", post(add_meal))
        .route("/days/:date/meals/:meal_id", put(update_meal).delete(delete_meal))
        .route("/days/:date/reorder", post(reorder_meals))
        .route("/selected-date", get(get_selected_date).put(select_date))
}

fn day_param(raw: &str) -> Result<Date, AppError> {
    parse_day(raw).map_err(|_| AppError::BadRequest(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}

// ---- templates ----

#[instrument(skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(services::load(&state, user_id).await?.templates))
}

#[instrument(skip(state, body))]
pub async fn create_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<TemplateDraft>,
) -> Result<(StatusCode, Json<Template>), AppError> {
    let draft = validate_draft(body).map_err(AppError::BadRequest)?;
    let template = services::mutate(&state, user_id, |s| Ok((s.add_template(draft), None))).await?;
    info!(%user_id, template_id = %template.id, is_default = template.is_default, "template created");
    Ok((StatusCode::CREATED, Json(template)))
}

#[instrument(skip(state, body))]
pub async fn update_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TemplatePatch>,
) -> Result<Json<Template>, AppError> {
    let patch = validate_patch(body).map_err(AppError::BadRequest)?;
    let template = services::mutate(&state, user_id, |s| Ok((s.update_template(id, patch)?, None))).await?;
    Ok(Json(template))
}

/// Days already built from the template keep their copies.
#[instrument(skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    services::mutate(&state, user_id, |s| Ok((s.delete_template(id)?, None))).await?;
    info!(%user_id, template_id = %id, "template deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn set_default_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Template>>, AppError> {
    let templates = services::mutate(&state, user_id, |s| {
        s.set_default_template(id)?;
        Ok((s.templates.clone(), None))
    })
    .await?;
    Ok(Json(templates))
}

// ---- days ----

#[instrument(skip(state))]
pub async fn get_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DayView>, AppError> {
    let date = day_param(&date)?;
    Ok(Json(services::day_view(&state, user_id, date).await?))
}

#[instrument(skip(state))]
pub async fn resolve_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DayData>, AppError> {
    let date = day_param(&date)?;
    Ok(Json(services::resolve_date(&state, user_id, date).await?))
}

/// Destructive: today's logs are removed before the template's meals land.
#[instrument(skip(state))]
pub async fn apply_template(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(body): Json<ApplyTemplateRequest>,
) -> Result<Json<DayData>, AppError> {
    let date = day_param(&date)?;
    Ok(Json(services::apply_template(&state, user_id, date, body.template_id).await?))
}

#[instrument(skip(state))]
pub async fn skip_template_selection(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DayData>, AppError> {
    let date = day_param(&date)?;
    Ok(Json(services::skip_template_selection(&state, user_id, date).await?))
}

#[instrument(skip(state))]
pub async fn initialize_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<InitializeResponse>, AppError> {
    let date = day_param(&date)?;
    let created = services::initialize_day(&state, user_id, date).await?;
    Ok(Json(InitializeResponse { created }))
}

#[instrument(skip(state))]
pub async fn set_day_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(goals): Json<MacroGoals>,
) -> Result<StatusCode, AppError> {
    let date = day_param(&date)?;
    goals.validate().map_err(AppError::BadRequest)?;
    services::mutate_day(&state, user_id, date, |s| s.set_day_goals(date, goals)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn add_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(body): Json<MealBlueprint>,
) -> Result<(StatusCode, Json<Meal>), AppError> {
    let date = day_param(&date)?;
    let meal = validate_blueprint(body).map_err(AppError::BadRequest)?;
    let meal = services::mutate_day(&state, user_id, date, |s| s.add_meal_to_day(date, meal)).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

/// Renaming orphans logs filed under the old name.
#[instrument(skip(state, body))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, meal_id)): Path<(String, Uuid)>,
    Json(body): Json<UpdateMealRequest>,
) -> Result<StatusCode, AppError> {
    let date = day_param(&date)?;
    let name = body
        .name
        .as_deref()
        .map(validate_meal_name)
        .transpose()
        .map_err(AppError::BadRequest)?;
    if let Some(goals) = &body.goals {
        goals.validate().map_err(AppError::BadRequest)?;
    }
    let goals = body.goals;
    services::mutate_day(&state, user_id, date, |s| {
        if let Some(goals) = goals {
            s.update_meal_goals(date, meal_id, goals)?;
        }
        if let Some(name) = name {
            s.rename_meal(date, meal_id, name)?;
        }
        Ok(())
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, meal_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    let date = day_param(&date)?;
    services::mutate_day(&state, user_id, date, |s| s.delete_meal_from_day(date, meal_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn reorder_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(body): Json<ReorderRequest>,
) -> Result<StatusCode, AppError> {
    let date = day_param(&date)?;
    services::mutate_day(&state, user_id, date, |s| {
        s.reorder_meals_in_day(date, body.from, body.to)
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- selection ----

#[instrument(skip(state))]
pub async fn get_selected_date(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SelectedDateResponse>, AppError> {
    let selected_date = services::load(&state, user_id).await?.selected_date;
    Ok(Json(SelectedDateResponse {
        selected_date,
        changed: false,
    }))
}

#[instrument(skip(state))]
pub async fn select_date(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<SelectDateRequest>,
) -> Result<Json<SelectedDateResponse>, AppError> {
    let (selected_date, changed) = services::select_date(&state, user_id, body.date).await?;
    Ok(Json(SelectedDateResponse {
        selected_date,
        changed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannerError;

    const TODAY: &str = "2024-06-15";

    async fn resolved_today(state: &AppState, me: Uuid) -> DayData {
        let Json(day) = skip_template_selection(State(state.clone()), AuthUser(me), Path(TODAY.into()))
            .await
            .unwrap();
        day
    }

    #[tokio::test]
    async fn rejects_malformed_dates() {
        let res = get_day(State(AppState::fake()), AuthUser(Uuid::new_v4()), Path("15/06/2024".into())).await;
        assert!(matches!(res, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn skip_without_templates_uses_fallback_meals() {
        let state = AppState::fake();
        let day = resolved_today(&state, Uuid::new_v4()).await;
        assert!(day.template_selected);
        let names: Vec<_> = day.meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Breakfast", "Lunch", "Dinner", "Snack"]);
    }

    #[tokio::test]
    async fn last_meal_cannot_be_deleted() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let day = resolved_today(&state, me).await;
        let (last, rest) = day.meals.split_last().unwrap();
        for meal in rest {
            delete_meal(State(state.clone()), AuthUser(me), Path((TODAY.into(), meal.id)))
                .await
                .unwrap();
        }
        let res = delete_meal(State(state), AuthUser(me), Path((TODAY.into(), last.id))).await;
        assert!(matches!(res, Err(AppError::Planner(PlannerError::LastMeal))));
    }

    #[tokio::test]
    async fn rename_and_regoal_a_meal() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let day = resolved_today(&state, me).await;
        let lunch = &day.meals[1];
        let goals = MacroGoals::new(900.0, 70.0, 80.0, 25.0);
        update_meal(
            State(state.clone()),
            AuthUser(me),
            Path((TODAY.into(), lunch.id)),
            Json(UpdateMealRequest {
                name: Some("Midday".into()),
                goals: Some(goals),
            }),
        )
        .await
        .unwrap();

        let Json(view) = get_day(State(state), AuthUser(me), Path(TODAY.into())).await.unwrap();
        assert_eq!(view.meals[1].meal.name, "Midday");
        assert_eq!(view.meals[1].meal.goals, goals);
    }

    #[tokio::test]
    async fn set_default_leaves_exactly_one() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let draft = |name: &str| TemplateDraft {
            name: name.into(),
            is_default: true,
            daily_goals: MacroGoals::new(2000.0, 150.0, 200.0, 60.0),
            meals: vec![MealBlueprint {
                name: "Lunch".into(),
                goals: MacroGoals::new(2000.0, 150.0, 200.0, 60.0),
            }],
        };
        let (_, Json(first)) = create_template(State(state.clone()), AuthUser(me), Json(draft("A")))
            .await
            .unwrap();
        create_template(State(state.clone()), AuthUser(me), Json(draft("B")))
            .await
            .unwrap();

        let Json(templates) = set_default_template(State(state), AuthUser(me), Path(first.id))
            .await
            .unwrap();
        let defaults: Vec<_> = templates.iter().filter(|t| t.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, first.id);
    }

    #[tokio::test]
    async fn goals_on_other_days_are_rejected() {
        let res = set_day_goals(
            State(AppState::fake()),
            AuthUser(Uuid::new_v4()),
            Path("2024-06-14".into()),
            Json(MacroGoals::new(2000.0, 150.0, 200.0, 60.0)),
        )
        .await;
        assert!(matches!(res, Err(AppError::InvalidDate(_))));
    }
}
