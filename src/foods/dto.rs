use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Food, NewFood};
use crate::nutrition::NutrientProfile;

#[derive(Debug, Serialize)]
pub struct FoodResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub profile: NutrientProfile,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Food> for FoodResponse {
    fn from(f: Food) -> Self {
        Self {
            id: f.id,
            name: f.name,
            profile: f.profile,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FoodRequest {
    pub name: String,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub calories_per_100g: f64,
}

impl FoodRequest {
    /// Trims the name and checks every value is present and non-negative.
    pub fn validate(self) -> Result<NewFood, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("name must not be empty".into());
        }
        let profile = NutrientProfile {
            protein_per_100g: self.protein_per_100g,
            carbs_per_100g: self.carbs_per_100g,
            fat_per_100g: self.fat_per_100g,
            calories_per_100g: self.calories_per_100g,
        };
        profile.validate()?;
        Ok(NewFood { name, profile })
    }
}
