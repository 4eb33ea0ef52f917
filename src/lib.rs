//! Daily nutrition targets and meal-photo estimation.
//!
//! [`targets`] turns a biometric profile into calorie and macro targets.
//! [`meals`] sends a meal photo to a vision model and validates the ranged
//! estimate it returns. Both are usable as plain library calls; [`app`]
//! exposes them over HTTP.

pub mod app;
pub mod config;
pub mod images;
pub mod inference;
pub mod meals;
pub mod state;
pub mod targets;
