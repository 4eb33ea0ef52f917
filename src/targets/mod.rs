pub mod dto;
pub mod engine;
mod handlers;

use crate::state::AppState;
use axum::Router;

pub use engine::{compute_daily_targets, evaluate_daily_targets};

pub fn router() -> Router<AppState> {
    handlers::targets_routes()
}
