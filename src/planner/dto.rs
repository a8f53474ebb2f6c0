use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::model::{MealBlueprint, TemplateDraft, TemplatePatch};
use crate::{
    calendar::day_key,
    logs::dto::MealSummary,
    nutrition::{MacroGoals, Macros},
};

#[derive(Debug, Deserialize)]
pub struct ApplyTemplateRequest {
    pub template_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub goals: Option<MacroGoals>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    #[serde(with = "day_key")]
    pub date: Date,
}

#[derive(Debug, Serialize)]
pub struct SelectedDateResponse {
    #[serde(with = "day_key::option")]
    pub selected_date: Option<Date>,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub created: bool,
}

/// Everything the day screen shows for one date.
#[derive(Debug, Serialize)]
pub struct DayView {
    #[serde(with = "day_key")]
    pub date: Date,
    pub editable: bool,
    pub needs_template_selection: bool,
    pub daily_goals: Option<MacroGoals>,
    pub meals: Vec<MealSummary>,
    pub totals: Macros,
}

pub fn validate_meal_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("meal name must not be empty".into());
    }
    Ok(name.to_string())
}

pub fn validate_blueprint(meal: MealBlueprint) -> Result<MealBlueprint, String> {
    meal.goals.validate()?;
    Ok(MealBlueprint {
        name: validate_meal_name(&meal.name)?,
        goals: meal.goals,
    })
}

fn validate_template_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("template name must not be empty".into());
    }
    Ok(name.to_string())
}

fn validate_meals(meals: Vec<MealBlueprint>) -> Result<Vec<MealBlueprint>, String> {
    if meals.is_empty() {
        return Err("a template needs at least one meal".into());
    }
    meals.into_iter().map(validate_blueprint).collect()
}

pub fn validate_draft(draft: TemplateDraft) -> Result<TemplateDraft, String> {
    draft.daily_goals.validate()?;
    Ok(TemplateDraft {
        name: validate_template_name(&draft.name)?,
        is_default: draft.is_default,
        daily_goals: draft.daily_goals,
        meals: validate_meals(draft.meals)?,
    })
}

pub fn validate_patch(patch: TemplatePatch) -> Result<TemplatePatch, String> {
    if let Some(goals) = &patch.daily_goals {
        goals.validate()?;
    }
    Ok(TemplatePatch {
        name: patch.name.as_deref().map(validate_template_name).transpose()?,
        is_default: patch.is_default,
        daily_goals: patch.daily_goals,
        meals: patch.meals.map(validate_meals).transpose()?,
    })
}
