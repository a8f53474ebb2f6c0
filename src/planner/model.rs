use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::{calendar::day_key, nutrition::MacroGoals};

/// Tag stored next to every persisted planner document.
pub const STORAGE_VERSION: &str = "fityo-storage-v3";

pub const FALLBACK_GOALS: MacroGoals = MacroGoals::new(2400.0, 180.0, 200.0, 70.0);

pub fn fallback_meals() -> Vec<MealBlueprint> {
    [
        ("Breakfast", MacroGoals::new(600.0, 45.0, 50.0, 18.0)),
        ("Lunch", MacroGoals::new(800.0, 60.0, 67.0, 23.0)),
        ("Dinner", MacroGoals::new(800.0, 60.0, 67.0, 23.0)),
        ("Snack", MacroGoals::new(200.0, 15.0, 16.0, 6.0)),
    ]
    .into_iter()
    .map(|(name, goals)| MealBlueprint {
        name: name.to_string(),
        goals,
    })
    .collect()
}

/// A named slot within a day. Logged food is matched to it by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub goals: MacroGoals,
}

impl Meal {
    pub fn matches(&self, meal_type: &str) -> bool {
        self.name.to_lowercase() == meal_type.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealBlueprint {
    pub name: String,
    pub goals: MacroGoals,
}

impl MealBlueprint {
    pub fn instantiate(&self) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            goals: self.goals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub daily_goals: MacroGoals,
    pub meals: Vec<MealBlueprint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    pub daily_goals: MacroGoals,
    pub meals: Vec<MealBlueprint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub is_default: Option<bool>,
    pub daily_goals: Option<MacroGoals>,
    pub meals: Option<Vec<MealBlueprint>>,
}

/// Goals and meal structure for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    #[serde(with = "day_key")]
    pub date: Date,
    pub daily_goals: MacroGoals,
    pub meals: Vec<Meal>,
    pub template_selected: bool,
}

impl DayData {
    fn from_blueprint(date: Date, goals: MacroGoals, meals: &[MealBlueprint], selected: bool) -> Self {
        Self {
            date,
            daily_goals: goals,
            meals: meals.iter().map(MealBlueprint::instantiate).collect(),
            template_selected: selected,
        }
    }

    pub(crate) fn from_template(date: Date, template: &Template) -> Self {
        Self::from_blueprint(date, template.daily_goals, &template.meals, true)
    }

    pub(crate) fn fallback(date: Date, selected: bool) -> Self {
        Self::from_blueprint(date, FALLBACK_GOALS, &fallback_meals(), selected)
    }
}

/// Per-user templates, day states and the currently viewed date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    pub templates: Vec<Template>,
    pub days: Vec<DayData>,
    #[serde(default, with = "day_key::option")]
    pub selected_date: Option<Date>,
}

/// Side effects a transition asks the caller to carry out on other stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ClearLogs(Date),
}

#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
    #[error("No day data for {0}")]
    DayNotFound(Date),
    #[error("Meal {0} not found")]
    MealNotFound(Uuid),
    #[error("Template {0} not found")]
    TemplateNotFound(Uuid),
    #[error("A day must keep at least one meal")]
    LastMeal,
    #[error("Meal index out of range (from {from}, to {to}, len {len})")]
    InvalidIndex { from: usize, to: usize, len: usize },
}
