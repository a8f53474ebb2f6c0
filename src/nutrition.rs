use serde::{Deserialize, Serialize};

/// Per-100g nutrient values of a food. Calories are entered by the user and
/// are not derived from the macro grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NutrientProfile {
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub calories_per_100g: f64,
}

impl NutrientProfile {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("protein_per_100g", self.protein_per_100g),
            ("carbs_per_100g", self.carbs_per_100g),
            ("fat_per_100g", self.fat_per_100g),
            ("calories_per_100g", self.calories_per_100g),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number"));
            }
        }
        Ok(())
    }
}

/// Daily or per-meal targets (kcal and grams).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroGoals {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("goal {name} must be a non-negative number"));
            }
        }
        Ok(())
    }
}

/// Absolute nutrient amounts for a consumed portion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
}

impl Macros {
    pub fn add(&mut self, other: &Macros) {
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        self.calories += other.calories;
    }

    /// Sum of many portions; macro grams are kept to one decimal.
    pub fn total<'a>(items: impl IntoIterator<Item = &'a Macros>) -> Macros {
        let mut sum = Macros::default();
        for m in items {
            sum.add(m);
        }
        Macros {
            protein: round1(sum.protein),
            carbs: round1(sum.carbs),
            fat: round1(sum.fat),
            calories: sum.calories.round(),
        }
    }
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Scales a per-100g profile to `grams`. Macros are rounded to one decimal,
/// calories to the nearest integer.
pub fn calculate_macros(profile: &NutrientProfile, grams: f64) -> Macros {
    Macros {
        protein: (profile.protein_per_100g * grams / 100.0 * 10.0).round() / 10.0,
        carbs: (profile.carbs_per_100g * grams / 100.0 * 10.0).round() / 10.0,
        fat: (profile.fat_per_100g * grams / 100.0 * 10.0).round() / 10.0,
        calories: (profile.calories_per_100g * grams / 100.0).round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> NutrientProfile {
        NutrientProfile {
            protein_per_100g: 31.0,
            carbs_per_100g: 0.0,
            fat_per_100g: 3.6,
            calories_per_100g: 165.0,
        }
    }

    #[test]
    fn zero_grams_is_all_zero() {
        assert_eq!(calculate_macros(&chicken(), 0.0), Macros::default());
    }

    #[test]
    fn hundred_grams_returns_profile_values() {
        let m = calculate_macros(&chicken(), 100.0);
        assert_eq!(m.protein, 31.0);
        assert_eq!(m.carbs, 0.0);
        assert_eq!(m.fat, 3.6);
        assert_eq!(m.calories, 165.0);
    }

    #[test]
    fn macros_round_to_one_decimal_and_calories_to_integer() {
        let p = NutrientProfile {
            protein_per_100g: 33.33,
            carbs_per_100g: 12.34,
            fat_per_100g: 1.05,
            calories_per_100g: 251.0,
        };
        let m = calculate_macros(&p, 150.0);
        assert_eq!(m.protein, 50.0);
        assert_eq!(m.carbs, 18.5);
        assert_eq!(m.fat, 1.6);
        assert_eq!(m.calories, 377.0);
    }

    #[test]
    fn scaling_is_linear() {
        let p = chicken();
        let single = calculate_macros(&p, 50.0);
        let double = calculate_macros(&p, 100.0);
        assert_eq!(single.protein * 2.0, double.protein);
        assert_eq!(single.fat * 2.0, double.fat);
    }

    #[test]
    fn calories_are_not_derived_from_macros() {
        let p = NutrientProfile {
            protein_per_100g: 10.0,
            carbs_per_100g: 10.0,
            fat_per_100g: 10.0,
            calories_per_100g: 1.0,
        };
        assert_eq!(calculate_macros(&p, 100.0).calories, 1.0);
    }

    #[test]
    fn validate_rejects_negative_and_nan() {
        let mut p = chicken();
        assert!(p.validate().is_ok());
        p.fat_per_100g = -1.0;
        assert!(p.validate().unwrap_err().contains("fat_per_100g"));
        p.fat_per_100g = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn total_sums_portions() {
        let a = Macros { protein: 10.1, carbs: 0.2, fat: 1.0, calories: 100.0 };
        let b = Macros { protein: 0.2, carbs: 0.1, fat: 2.0, calories: 50.0 };
        let t = Macros::total([&a, &b]);
        assert_eq!(t, Macros { protein: 10.3, carbs: 0.3, fat: 3.0, calories: 150.0 });
    }
}
