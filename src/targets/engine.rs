use tracing::warn;

use super::dto::{ActivityLevel, DailyTargets, Goal, Sex, TargetsReport, TargetsWarning, UserProfile};

/// kcal stored in 1 kg of body mass.
const KCAL_PER_KG: f64 = 7700.0;
const PROTEIN_G_PER_KG: f64 = 2.2;

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

const FAT_SHARE: f64 = 0.3;
const CARB_SHARE: f64 = 0.7;
const RANGE_LOW: f64 = 0.8;
const RANGE_HIGH: f64 = 1.2;

/// Daily targets for `profile`, sized for the target body weight.
///
/// The target weight is `target_weight` when set and non-zero, otherwise the
/// profile's goal weight, otherwise its current weight.
pub fn compute_daily_targets(profile: &UserProfile, target_weight: Option<f64>) -> DailyTargets {
    evaluate_daily_targets(profile, target_weight).targets
}

/// Same computation as [`compute_daily_targets`], keeping the advisory warnings.
pub fn evaluate_daily_targets(profile: &UserProfile, target_weight: Option<f64>) -> TargetsReport {
    let weight = resolve_target_weight(profile, target_weight);

    // BMR uses the goal body, not the current one.
    let bmr = basal_metabolic_rate(profile.sex, weight, profile.height, profile.age);
    let maintenance = round_half_up(bmr * activity_multiplier(profile.activity_level));
    let target_calories = round_half_up(maintenance + calorie_adjustment(profile));

    let protein = round_half_up(weight * PROTEIN_G_PER_KG);
    // kept in f64; huge finite profiles must not overflow integer math
    let remaining = target_calories - protein * KCAL_PER_G_PROTEIN;

    let fat_calories = remaining * FAT_SHARE;
    let carb_calories = remaining * CARB_SHARE;

    let mut warnings = Vec::new();
    if remaining < 0.0 {
        warn!(
            remaining_calories = remaining,
            target_calories, protein, "protein exceeds calorie target; clamping macro ranges"
        );
        warnings.push(TargetsWarning::DegenerateTargets {
            // `as` saturates at the i64 bounds
            remaining_calories: remaining as i64,
        });
    }

    let targets = DailyTargets {
        calories: clamp_grams(target_calories),
        protein: clamp_grams(protein),
        carbs_min: clamp_grams(round_half_up(carb_calories * RANGE_LOW / KCAL_PER_G_CARBS)),
        carbs_max: clamp_grams(round_half_up(carb_calories * RANGE_HIGH / KCAL_PER_G_CARBS)),
        fat_min: clamp_grams(round_half_up(fat_calories * RANGE_LOW / KCAL_PER_G_FAT)),
        fat_max: clamp_grams(round_half_up(fat_calories * RANGE_HIGH / KCAL_PER_G_FAT)),
    };

    TargetsReport { targets, warnings }
}

fn resolve_target_weight(profile: &UserProfile, target_weight: Option<f64>) -> f64 {
    [target_weight, Some(profile.goal_weight)]
        .into_iter()
        .flatten()
        .find(|w| *w != 0.0)
        .unwrap_or(profile.weight)
}

/// Mifflin-St Jeor.
fn basal_metabolic_rate(sex: Sex, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

const fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Low => 1.2,
        ActivityLevel::Moderate => 1.5,
        ActivityLevel::High => 1.8,
    }
}

fn calorie_adjustment(profile: &UserProfile) -> f64 {
    match profile.weekly_weight_change {
        Some(change) if change != 0.0 => round_half_up(change * KCAL_PER_KG / 7.0),
        _ => match profile.goal {
            Goal::FatLoss => -500.0,
            Goal::Maintenance => 0.0,
            Goal::MuscleGain => 300.0,
        },
    }
}

/// Half-up rounding, `-2.5` rounds to `-2`.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn clamp_grams(x: f64) -> u32 {
    // `as` saturates and maps NaN to 0
    x.max(0.0) as u32
}
