use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One recognised food with ranged nutrients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemEstimate {
    pub name: String,
    pub portion: String,
    pub calories_min: f64,
    pub calories_max: f64,
    pub protein_min: f64, // g
    pub protein_max: f64,
    pub carbs_min: f64, // g
    pub carbs_max: f64,
    pub fat_min: f64, // g
    pub fat_max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar_min: Option<f64>, // g
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber_min: Option<f64>, // g
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium_min: Option<f64>, // mg
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium_max: Option<f64>,
}

/// Structured estimate for one meal photo.
///
/// Meal totals are estimated by the model on their own and are not required
/// to equal the sum of the item ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    pub foods: Vec<FoodItemEstimate>,
    pub total_calories_min: f64,
    pub total_calories_max: f64,
    pub total_protein_min: f64,
    pub total_protein_max: f64,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}

/// Pending entry handed back to the caller for confirmation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedMeal {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub analyzed_at: OffsetDateTime,
    pub analysis: MealAnalysis,
}

impl AnalyzedMeal {
    pub fn pending(analysis: MealAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            analyzed_at: OffsetDateTime::now_utc(),
            analysis,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMealBase64 {
    pub image_b64: String,
    #[serde(default)]
    pub content_type: Option<String>,
}
