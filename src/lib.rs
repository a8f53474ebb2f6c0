pub mod app;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod foods;
pub mod history;
pub mod logs;
pub mod nutrition;
pub mod planner;
pub mod state;
pub mod store;
pub mod weight;
