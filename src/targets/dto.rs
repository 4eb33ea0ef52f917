use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[serde(alias = "Male")]
    Male,
    #[serde(alias = "Female")]
    Female,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    FatLoss,
    Maintenance,
    MuscleGain,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

/// Biometric snapshot the targets are computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: u32,
    pub sex: Sex,
    pub height: f64,      // cm
    pub weight: f64,      // kg, current
    pub goal_weight: f64, // kg
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    /// kg per week, signed; overrides the goal-based adjustment when non-zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_weight_change: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTargets {
    pub calories: u32,
    pub protein: u32,
    pub carbs_min: u32,
    pub carbs_max: u32,
    pub fat_min: u32,
    pub fat_max: u32,
}

/// Advisory flags raised while computing targets. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetsWarning {
    /// Protein alone exceeds the calorie target; fat/carb ranges were clamped.
    DegenerateTargets {
        #[serde(rename = "remainingCalories")]
        remaining_calories: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetsReport {
    pub targets: DailyTargets,
    pub warnings: Vec<TargetsWarning>,
}

impl TargetsReport {
    pub fn is_degenerate(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, TargetsWarning::DegenerateTargets { .. }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetsRequest {
    pub profile: UserProfile,
    #[serde(default)]
    pub target_weight: Option<f64>,
}
