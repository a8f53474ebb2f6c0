//! Day/template transitions over [`PlannerState`].
//!
//! All functions here are synchronous and storage-free. A date is
//! `Unresolved` when it has no [`DayData`] or its row has
//! `template_selected == false`, and `Resolved` otherwise. Transitions that
//! touch other entities return [`Effect`]s instead of performing them.
//! Date editability is checked by the service layer, not here.

use time::Date;
use uuid::Uuid;

use super::model::{
    DayData, Effect, Meal, MealBlueprint, PlannerError, PlannerState, Template, TemplateDraft,
    TemplatePatch,
};
use crate::nutrition::MacroGoals;

impl PlannerState {
    pub fn day(&self, date: Date) -> Option<&DayData> {
        self.days.iter().find(|d| d.date == date)
    }

    fn day_mut(&mut self, date: Date) -> Result<&mut DayData, PlannerError> {
        self.days
            .iter_mut()
            .find(|d| d.date == date)
            .ok_or(PlannerError::DayNotFound(date))
    }

    fn put_day(&mut self, day: DayData) {
        match self.days.iter_mut().find(|d| d.date == day.date) {
            Some(existing) => *existing = day,
            None => self.days.push(day),
        }
    }

    pub fn needs_template_selection(&self, date: Date) -> bool {
        self.day(date).map_or(true, |d| !d.template_selected)
    }

    // ---- templates ----

    pub fn template(&self, id: Uuid) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn default_template(&self) -> Option<&Template> {
        self.templates.iter().find(|t| t.is_default)
    }

    pub fn add_template(&mut self, draft: TemplateDraft) -> Template {
        let template = Template {
            id: Uuid::new_v4(),
            name: draft.name,
            is_default: draft.is_default,
            daily_goals: draft.daily_goals,
            meals: draft.meals,
        };
        if template.is_default {
            self.clear_default();
        }
        self.templates.push(template.clone());
        template
    }

    pub fn update_template(&mut self, id: Uuid, patch: TemplatePatch) -> Result<Template, PlannerError> {
        if patch.is_default == Some(true) {
            self.template(id).ok_or(PlannerError::TemplateNotFound(id))?;
            self.clear_default();
        }
        let template = self
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(PlannerError::TemplateNotFound(id))?;
        if let Some(name) = patch.name {
            template.name = name;
        }
        if let Some(is_default) = patch.is_default {
            template.is_default = is_default;
        }
        if let Some(goals) = patch.daily_goals {
            template.daily_goals = goals;
        }
        if let Some(meals) = patch.meals {
            template.meals = meals;
        }
        Ok(template.clone())
    }

    pub fn delete_template(&mut self, id: Uuid) -> Result<(), PlannerError> {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        if self.templates.len() == before {
            return Err(PlannerError::TemplateNotFound(id));
        }
        Ok(())
    }

    /// Marks `id` as the only default template.
    pub fn set_default_template(&mut self, id: Uuid) -> Result<(), PlannerError> {
        self.template(id).ok_or(PlannerError::TemplateNotFound(id))?;
        for t in &mut self.templates {
            t.is_default = t.id == id;
        }
        Ok(())
    }

    fn clear_default(&mut self) {
        for t in &mut self.templates {
            t.is_default = false;
        }
    }

    // ---- day resolution ----

    /// Creates an unresolved day with the built-in goals and meals, unless a
    /// row already exists.
    pub fn initialize_day_without_template(&mut self, date: Date) -> bool {
        if self.day(date).is_some() {
            return false;
        }
        self.days.push(DayData::fallback(date, false));
        true
    }

    /// Replaces the day with fresh copies of the template. Destructive: the
    /// caller must clear the date's logs as instructed by the returned effect.
    pub fn apply_template(&mut self, date: Date, template: &Template) -> Effect {
        self.put_day(DayData::from_template(date, template));
        Effect::ClearLogs(date)
    }

    /// Resolves a date without picking a template explicitly. An existing
    /// row keeps its meals; a missing one is built from the default template
    /// or the built-in fallback.
    pub fn skip_template_selection(&mut self, date: Date) {
        if let Ok(day) = self.day_mut(date) {
            day.template_selected = true;
            return;
        }
        let day = match self.default_template() {
            Some(t) => DayData::from_template(date, t),
            None => DayData::fallback(date, true),
        };
        self.days.push(day);
    }

    /// Default path for an unresolved date: apply the default template when
    /// there is one, otherwise resolve with the built-in fallback. Resolved
    /// dates are left untouched.
    pub fn resolve(&mut self, date: Date) -> Option<Effect> {
        if !self.needs_template_selection(date) {
            return None;
        }
        match self.default_template().cloned() {
            Some(template) => Some(self.apply_template(date, &template)),
            None => {
                self.put_day(DayData::fallback(date, true));
                None
            }
        }
    }

    // ---- localized day mutations ----

    pub fn set_day_goals(&mut self, date: Date, goals: MacroGoals) -> Result<(), PlannerError> {
        self.day_mut(date)?.daily_goals = goals;
        Ok(())
    }

    pub fn add_meal_to_day(&mut self, date: Date, meal: MealBlueprint) -> Result<Meal, PlannerError> {
        let day = self.day_mut(date)?;
        let meal = meal.instantiate();
        day.meals.push(meal.clone());
        Ok(meal)
    }

    fn meal_mut(&mut self, date: Date, meal_id: Uuid) -> Result<&mut Meal, PlannerError> {
        self.day_mut(date)?
            .meals
            .iter_mut()
            .find(|m| m.id == meal_id)
            .ok_or(PlannerError::MealNotFound(meal_id))
    }

    pub fn update_meal_goals(&mut self, date: Date, meal_id: Uuid, goals: MacroGoals) -> Result<(), PlannerError> {
        self.meal_mut(date, meal_id)?.goals = goals;
        Ok(())
    }

    /// Renaming does not touch logged food; logs still carrying the old name
    /// no longer match any meal of the day.
    pub fn rename_meal(&mut self, date: Date, meal_id: Uuid, name: String) -> Result<(), PlannerError> {
        self.meal_mut(date, meal_id)?.name = name;
        Ok(())
    }

    pub fn delete_meal_from_day(&mut self, date: Date, meal_id: Uuid) -> Result<(), PlannerError> {
        let day = self.day_mut(date)?;
        let idx = day
            .meals
            .iter()
            .position(|m| m.id == meal_id)
            .ok_or(PlannerError::MealNotFound(meal_id))?;
        if day.meals.len() == 1 {
            return Err(PlannerError::LastMeal);
        }
        day.meals.remove(idx);
        Ok(())
    }

    pub fn reorder_meals_in_day(&mut self, date: Date, from: usize, to: usize) -> Result<(), PlannerError> {
        let day = self.day_mut(date)?;
        let len = day.meals.len();
        if from >= len || to >= len {
            return Err(PlannerError::InvalidIndex { from, to, len });
        }
        let meal = day.meals.remove(from);
        day.meals.insert(to, meal);
        Ok(())
    }

    // ---- selection ----

    /// Future dates are ignored; returns whether the selection changed.
    pub fn select_date(&mut self, date: Date, today: Date) -> bool {
        if crate::calendar::is_future(date, today) {
            return false;
        }
        self.selected_date = Some(date);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::model::{fallback_meals, FALLBACK_GOALS};
    use time::macros::date;

    const TODAY: Date = date!(2024 - 06 - 15);

    fn draft(name: &str, is_default: bool) -> TemplateDraft {
        TemplateDraft {
            name: name.into(),
            is_default,
            daily_goals: MacroGoals::new(2000.0, 150.0, 180.0, 60.0),
            meals: vec![
                MealBlueprint {
                    name: "Oats".into(),
                    goals: MacroGoals::new(500.0, 30.0, 60.0, 10.0),
                },
                MealBlueprint {
                    name: "Steak".into(),
                    goals: MacroGoals::new(1500.0, 120.0, 120.0, 50.0),
                },
            ],
        }
    }

    fn resolved_state() -> PlannerState {
        let mut st = PlannerState::default();
        st.skip_template_selection(TODAY);
        st
    }

    #[test]
    fn unknown_date_needs_selection() {
        let st = PlannerState::default();
        assert!(st.needs_template_selection(TODAY));
    }

    #[test]
    fn initialized_day_is_still_unresolved() {
        let mut st = PlannerState::default();
        assert!(st.initialize_day_without_template(TODAY));
        assert!(!st.initialize_day_without_template(TODAY));
        assert!(st.needs_template_selection(TODAY));
        assert_eq!(st.day(TODAY).unwrap().meals.len(), 4);
    }

    #[test]
    fn resolve_applies_default_template() {
        let mut st = PlannerState::default();
        st.add_template(draft("Cut", false));
        let def = st.add_template(draft("Bulk", true));
        assert!(st.needs_template_selection(TODAY));

        let effect = st.resolve(TODAY);

        assert_eq!(effect, Some(Effect::ClearLogs(TODAY)));
        assert!(!st.needs_template_selection(TODAY));
        let day = st.day(TODAY).unwrap();
        assert_eq!(day.daily_goals, def.daily_goals);
        let names: Vec<_> = day.meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Oats", "Steak"]);
    }

    #[test]
    fn resolve_without_default_uses_fallback() {
        let mut st = PlannerState::default();
        st.add_template(draft("Cut", false));
        assert_eq!(st.resolve(TODAY), None);
        let day = st.day(TODAY).unwrap();
        assert!(day.template_selected);
        assert_eq!(day.daily_goals, FALLBACK_GOALS);
        let expected: Vec<_> = fallback_meals().into_iter().map(|m| m.name).collect();
        let names: Vec<_> = day.meals.iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn resolve_leaves_resolved_day_alone() {
        let mut st = resolved_state();
        st.add_template(draft("Bulk", true));
        let before = st.day(TODAY).cloned();
        assert_eq!(st.resolve(TODAY), None);
        assert_eq!(st.day(TODAY).cloned(), before);
    }

    #[test]
    fn apply_template_regenerates_meal_ids() {
        let mut st = PlannerState::default();
        let t = st.add_template(draft("Cut", false));
        st.apply_template(TODAY, &t);
        let first: Vec<_> = st.day(TODAY).unwrap().meals.iter().map(|m| m.id).collect();
        st.apply_template(TODAY, &t);
        let day = st.day(TODAY).unwrap();
        assert_eq!(st.days.len(), 1);
        assert!(day.meals.iter().all(|m| !first.contains(&m.id)));
        for (meal, bp) in day.meals.iter().zip(&t.meals) {
            assert_eq!(meal.name, bp.name);
            assert_eq!(meal.goals, bp.goals);
        }
    }

    #[test]
    fn set_default_leaves_exactly_one() {
        let mut st = PlannerState::default();
        let a = st.add_template(draft("A", true));
        let b = st.add_template(draft("B", false));
        let c = st.add_template(draft("C", true));
        assert_eq!(st.templates.iter().filter(|t| t.is_default).count(), 1);
        assert_eq!(st.default_template().unwrap().id, c.id);

        st.set_default_template(b.id).unwrap();
        let defaults: Vec<_> = st.templates.iter().filter(|t| t.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, b.id);

        st.update_template(a.id, TemplatePatch { is_default: Some(true), ..Default::default() })
            .unwrap();
        assert_eq!(st.default_template().unwrap().id, a.id);
        assert_eq!(st.templates.iter().filter(|t| t.is_default).count(), 1);
    }

    #[test]
    fn set_default_unknown_id_keeps_state() {
        let mut st = PlannerState::default();
        let a = st.add_template(draft("A", true));
        let missing = Uuid::new_v4();
        assert_eq!(
            st.set_default_template(missing),
            Err(PlannerError::TemplateNotFound(missing))
        );
        assert_eq!(st.default_template().unwrap().id, a.id);
    }

    #[test]
    fn skip_marks_existing_day_resolved() {
        let mut st = PlannerState::default();
        st.initialize_day_without_template(TODAY);
        let meals = st.day(TODAY).unwrap().meals.clone();
        st.skip_template_selection(TODAY);
        let day = st.day(TODAY).unwrap();
        assert!(day.template_selected);
        assert_eq!(day.meals, meals);
    }

    #[test]
    fn mutations_without_day_change_nothing() {
        let mut st = PlannerState::default();
        let goals = MacroGoals::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(st.set_day_goals(TODAY, goals), Err(PlannerError::DayNotFound(TODAY)));
        assert!(st
            .add_meal_to_day(TODAY, MealBlueprint { name: "X".into(), goals })
            .is_err());
        assert!(st.reorder_meals_in_day(TODAY, 0, 1).is_err());
        assert!(st.days.is_empty());
    }

    #[test]
    fn meal_edits() {
        let mut st = resolved_state();
        let goals = MacroGoals::new(300.0, 20.0, 30.0, 10.0);
        let meal = st
            .add_meal_to_day(TODAY, MealBlueprint { name: "Shake".into(), goals })
            .unwrap();
        st.rename_meal(TODAY, meal.id, "Protein shake".into()).unwrap();
        st.update_meal_goals(TODAY, meal.id, MacroGoals::new(350.0, 40.0, 20.0, 8.0))
            .unwrap();
        let day = st.day(TODAY).unwrap();
        let edited = day.meals.last().unwrap();
        assert_eq!(edited.name, "Protein shake");
        assert_eq!(edited.goals.protein, 40.0);

        st.set_day_goals(TODAY, goals).unwrap();
        assert_eq!(st.day(TODAY).unwrap().daily_goals, goals);

        let ghost = Uuid::new_v4();
        assert_eq!(
            st.rename_meal(TODAY, ghost, "x".into()),
            Err(PlannerError::MealNotFound(ghost))
        );
    }

    #[test]
    fn last_meal_cannot_be_deleted() {
        let mut st = resolved_state();
        let ids: Vec<_> = st.day(TODAY).unwrap().meals.iter().map(|m| m.id).collect();
        for id in &ids[1..] {
            st.delete_meal_from_day(TODAY, *id).unwrap();
        }
        assert_eq!(st.delete_meal_from_day(TODAY, ids[0]), Err(PlannerError::LastMeal));
        assert_eq!(st.day(TODAY).unwrap().meals.len(), 1);
    }

    #[test]
    fn reorder_moves_meal() {
        let mut st = resolved_state();
        st.reorder_meals_in_day(TODAY, 3, 0).unwrap();
        let names: Vec<_> = st.day(TODAY).unwrap().meals.iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, ["Snack", "Breakfast", "Lunch", "Dinner"]);
        assert_eq!(
            st.reorder_meals_in_day(TODAY, 0, 4),
            Err(PlannerError::InvalidIndex { from: 0, to: 4, len: 4 })
        );
    }

    #[test]
    fn future_selection_is_ignored() {
        let mut st = PlannerState::default();
        assert!(st.select_date(date!(2024 - 06 - 01), TODAY));
        assert!(!st.select_date(date!(2024 - 06 - 16), TODAY));
        assert_eq!(st.selected_date, Some(date!(2024 - 06 - 01)));
    }

    #[test]
    fn meal_matching_ignores_case() {
        let meal = MealBlueprint {
            name: "lunch".into(),
            goals: FALLBACK_GOALS,
        }
        .instantiate();
        assert!(meal.matches("Lunch"));
        assert!(meal.matches("LUNCH"));
        assert!(!meal.matches("Midday"));
    }

    #[test]
    fn state_survives_json() {
        let mut st = resolved_state();
        st.add_template(draft("Cut", true));
        st.select_date(TODAY, TODAY);
        let json = serde_json::to_value(&st).unwrap();
        assert_eq!(json["days"][0]["date"], "2024-06-15");
        let back: PlannerState = serde_json::from_value(json).unwrap();
        assert_eq!(back, st);
    }
}
