//! Storage backends. Each one implements every store port
//! (`UserStore`, `FoodStore`, `FoodLogStore`, `WeightStore`, `PlannerStore`).

pub mod local;
pub mod postgres;
