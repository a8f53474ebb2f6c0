use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use time::Date;
use tracing::{error, warn};

use crate::planner::PlannerError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Date {0} is not editable")]
    InvalidDate(Date),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Planner(#[from] PlannerError),

    #[error("Storage failure")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidDate(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Planner(e) => match e {
                PlannerError::DayNotFound(_)
                | PlannerError::MealNotFound(_)
                | PlannerError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
                PlannerError::LastMeal => StatusCode::CONFLICT,
                PlannerError::InvalidIndex { .. } => StatusCode::BAD_REQUEST,
            },
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Storage(e) => error!(error = ?e, "storage failure"),
            other => warn!(%status, error = %other, "request rejected"),
        }
        (status, self.to_string()).into_response()
    }
}
