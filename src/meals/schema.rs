use serde_json::{json, Value};

use super::dto::{FoodItemEstimate, MealAnalysis};
use super::error::EstimationError;

fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

/// Output schema sent with every estimation request.
pub fn meal_analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "foods": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "portion": { "type": "string", "description": "visible portion, e.g. '1 cup' or '150 g'" },
                        "caloriesMin": number("kcal"),
                        "caloriesMax": number("kcal"),
                        "proteinMin": number("g"),
                        "proteinMax": number("g"),
                        "carbsMin": number("g"),
                        "carbsMax": number("g"),
                        "fatMin": number("g"),
                        "fatMax": number("g"),
                        "sugarMin": number("g"),
                        "sugarMax": number("g"),
                        "fiberMin": number("g"),
                        "fiberMax": number("g"),
                        "sodiumMin": number("mg"),
                        "sodiumMax": number("mg")
                    },
                    "required": [
                        "name", "portion",
                        "caloriesMin", "caloriesMax", "proteinMin", "proteinMax",
                        "carbsMin", "carbsMax", "fatMin", "fatMax"
                    ]
                }
            },
            "totalCaloriesMin": number("kcal"),
            "totalCaloriesMax": number("kcal"),
            "totalProteinMin": number("g"),
            "totalProteinMax": number("g"),
            "confidence": { "type": "string", "enum": ["high", "medium", "low"] },
            "tips": { "type": "array", "items": { "type": "string" } }
        },
        "required": [
            "foods", "totalCaloriesMin", "totalCaloriesMax",
            "totalProteinMin", "totalProteinMax", "confidence"
        ]
    })
}

/// Parses raw model output. Anything that is not a valid analysis is rejected.
pub fn parse_meal_analysis(raw: &str) -> Result<MealAnalysis, EstimationError> {
    let value: Value = serde_json::from_str(raw.trim())?;
    validate_meal_analysis(value)
}

pub fn validate_meal_analysis(value: Value) -> Result<MealAnalysis, EstimationError> {
    let analysis: MealAnalysis = serde_json::from_value(value)?;
    check_ranges(&analysis).map_err(EstimationError::SchemaValidation)?;
    Ok(analysis)
}

fn check_ranges(a: &MealAnalysis) -> Result<(), String> {
    check_pair("totalCalories", a.total_calories_min, a.total_calories_max)?;
    check_pair("totalProtein", a.total_protein_min, a.total_protein_max)?;

    for (i, item) in a.foods.iter().enumerate() {
        check_item(item).map_err(|e| format!("foods[{i}]: {e}"))?;
    }
    Ok(())
}

fn check_item(item: &FoodItemEstimate) -> Result<(), String> {
    if item.name.trim().is_empty() {
        return Err("name is empty".into());
    }
    check_pair("calories", item.calories_min, item.calories_max)?;
    check_pair("protein", item.protein_min, item.protein_max)?;
    check_pair("carbs", item.carbs_min, item.carbs_max)?;
    check_pair("fat", item.fat_min, item.fat_max)?;

    let optional = [
        ("sugar", item.sugar_min, item.sugar_max),
        ("fiber", item.fiber_min, item.fiber_max),
        ("sodium", item.sodium_min, item.sodium_max),
    ];
    for (label, min, max) in optional {
        match (min, max) {
            (None, None) => {}
            (Some(min), Some(max)) => check_pair(label, min, max)?,
            _ => return Err(format!("{label}Min and {label}Max must be given together")),
        }
    }
    Ok(())
}

fn check_pair(label: &str, min: f64, max: f64) -> Result<(), String> {
    if !min.is_finite() || !max.is_finite() {
        return Err(format!("{label} range is not finite"));
    }
    if min < 0.0 {
        return Err(format!("{label}Min is negative ({min})"));
    }
    if min > max {
        return Err(format!("{label}Min ({min}) exceeds {label}Max ({max})"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_response() -> Value {
    json!({
        "foods": [
            {
                "name": "Grilled chicken breast",
                "portion": "about 150 g",
                "caloriesMin": 220, "caloriesMax": 280,
                "proteinMin": 40, "proteinMax": 48,
                "carbsMin": 0, "carbsMax": 2,
                "fatMin": 4, "fatMax": 8,
                "sodiumMin": 90, "sodiumMax": 160
            },
            {
                "name": "White rice",
                "portion": "1 cup",
                "caloriesMin": 180, "caloriesMax": 240,
                "proteinMin": 3.5, "proteinMax": 5,
                "carbsMin": 40, "carbsMax": 53,
                "fatMin": 0.3, "fatMax": 0.6,
                "sugarMin": 0, "sugarMax": 0.2,
                "fiberMin": 0.4, "fiberMax": 0.8
            }
        ],
        "totalCaloriesMin": 400,
        "totalCaloriesMax": 520,
        "totalProteinMin": 43,
        "totalProteinMax": 53,
        "confidence": "medium",
        "tips": ["Add a vegetable side for fiber."]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::dto::Confidence;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_well_formed_response() {
        let analysis = validate_meal_analysis(sample_response()).unwrap();
        assert_eq!(analysis.foods.len(), 2);
        assert_eq!(analysis.foods[0].name, "Grilled chicken breast");
        assert_eq!(analysis.foods[0].sodium_min, Some(90.0));
        assert_eq!(analysis.foods[0].sugar_min, None);
        assert_eq!(analysis.confidence, Confidence::Medium);
        assert_eq!(analysis.tips.as_deref().map(<[String]>::len), Some(1));
    }

    #[test]
    fn produced_analysis_revalidates() {
        let analysis = validate_meal_analysis(sample_response()).unwrap();
        let again = validate_meal_analysis(serde_json::to_value(&analysis).unwrap()).unwrap();
        assert_eq!(analysis, again);
    }

    #[test]
    fn rejects_missing_confidence() {
        let mut value = sample_response();
        value.as_object_mut().unwrap().remove("confidence");
        let err = validate_meal_analysis(value).unwrap_err();
        assert!(matches!(err, EstimationError::SchemaValidation(_)), "{err}");
    }

    #[test]
    fn rejects_unknown_confidence() {
        let mut value = sample_response();
        value["confidence"] = json!("certain");
        assert!(matches!(
            validate_meal_analysis(value),
            Err(EstimationError::SchemaValidation(_))
        ));
    }

    #[test]
    fn rejects_inverted_item_calories() {
        let mut value = sample_response();
        value["foods"][1]["caloriesMin"] = json!(300);
        match validate_meal_analysis(value) {
            Err(EstimationError::SchemaValidation(msg)) => {
                assert!(msg.contains("foods[1]"), "{msg}");
                assert!(msg.contains("caloriesMin"), "{msg}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_inverted_totals() {
        let mut value = sample_response();
        value["totalProteinMin"] = json!(60);
        assert!(validate_meal_analysis(value).is_err());
    }

    #[test]
    fn rejects_half_micronutrient_pair() {
        let mut value = sample_response();
        value["foods"][0].as_object_mut().unwrap().remove("sodiumMax");
        let err = validate_meal_analysis(value).unwrap_err();
        assert!(err.to_string().contains("sodium"), "{err}");
    }

    #[test]
    fn rejects_negative_and_mistyped_values() {
        let mut negative = sample_response();
        negative["foods"][0]["fatMin"] = json!(-1);
        assert!(validate_meal_analysis(negative).is_err());

        let mut mistyped = sample_response();
        mistyped["foods"][0]["caloriesMax"] = json!("lots");
        assert!(validate_meal_analysis(mistyped).is_err());
    }

    #[test]
    fn rejects_blank_name() {
        let mut value = sample_response();
        value["foods"][0]["name"] = json!("  ");
        assert!(validate_meal_analysis(value).is_err());
    }

    #[test]
    fn accepts_empty_plate() {
        let value = json!({
            "foods": [],
            "totalCaloriesMin": 0, "totalCaloriesMax": 0,
            "totalProteinMin": 0, "totalProteinMax": 0,
            "confidence": "low"
        });
        let analysis = validate_meal_analysis(value).unwrap();
        assert!(analysis.foods.is_empty());
        assert_eq!(analysis.tips, None);
    }

    #[test]
    fn parse_rejects_non_json_text() {
        let err = parse_meal_analysis("I think this is a salad").unwrap_err();
        assert!(matches!(err, EstimationError::SchemaValidation(_)));
    }

    #[test]
    fn schema_requires_confidence_and_item_ranges() {
        let schema = meal_analysis_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("confidence")));
        let item_required = schema["properties"]["foods"]["items"]["required"]
            .as_array()
            .unwrap();
        assert!(item_required.contains(&json!("caloriesMin")));
        assert!(!item_required.contains(&json!("sugarMin")));
    }
}
