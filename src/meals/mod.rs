pub mod dto;
pub mod error;
mod handlers;
pub mod schema;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use error::EstimationError;
pub use schema::{meal_analysis_schema, validate_meal_analysis};
pub use services::MealEstimator;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    handlers::analyze_routes(max_upload_bytes)
}
