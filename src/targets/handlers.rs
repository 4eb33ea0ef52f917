use axum::{http::StatusCode, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use super::dto::{TargetsReport, TargetsRequest, UserProfile};
use super::engine::evaluate_daily_targets;
use crate::state::AppState;

pub fn targets_routes() -> Router<AppState> {
    Router::new().route("/targets", post(compute_targets))
}

/// POST /targets { profile, targetWeight? }
#[instrument(skip(body))]
pub async fn compute_targets(
    Json(body): Json<TargetsRequest>,
) -> Result<Json<TargetsReport>, (StatusCode, String)> {
    if let Err(msg) = check_profile(&body.profile, body.target_weight) {
        warn!(reason = %msg, "rejected profile");
        return Err((StatusCode::BAD_REQUEST, msg));
    }

    let report = evaluate_daily_targets(&body.profile, body.target_weight);
    info!(
        calories = report.targets.calories,
        degenerate = report.is_degenerate(),
        "targets computed"
    );
    Ok(Json(report))
}

// The engine is total; sanity checks live at the service boundary.
fn check_profile(p: &UserProfile, target_weight: Option<f64>) -> Result<(), String> {
    if p.age == 0 {
        return Err("age must be positive".into());
    }
    let positive = [("height", p.height), ("weight", p.weight)];
    for (field, v) in positive {
        if !v.is_finite() || v <= 0.0 {
            return Err(format!("{field} must be a positive number"));
        }
    }
    let optional = [
        ("goalWeight", Some(p.goal_weight)),
        ("targetWeight", target_weight),
        ("weeklyWeightChange", p.weekly_weight_change),
    ];
    for (field, v) in optional {
        if let Some(v) = v {
            if !v.is_finite() {
                return Err(format!("{field} must be a finite number"));
            }
        }
    }
    if p.goal_weight < 0.0 || target_weight.is_some_and(|w| w < 0.0) {
        return Err("target weight must not be negative".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use axum::{body::Body, http::Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post_targets(body: Value) -> (StatusCode, Value) {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/targets")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn profile_json() -> Value {
        json!({
            "age": 30,
            "sex": "male",
            "height": 175,
            "weight": 80,
            "goalWeight": 75,
            "goal": "fat_loss",
            "activityLevel": "moderate"
        })
    }

    #[tokio::test]
    async fn computes_targets_over_http() {
        let (status, body) = post_targets(json!({ "profile": profile_json() })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targets"]["calories"], 2048);
        assert_eq!(body["targets"]["protein"], 165);
        assert_eq!(body["targets"]["carbsMin"], 194);
        assert_eq!(body["targets"]["fatMax"], 56);
        assert_eq!(body["warnings"], json!([]));
    }

    #[tokio::test]
    async fn target_weight_override_is_applied() {
        let (status, body) =
            post_targets(json!({ "profile": profile_json(), "targetWeight": 70 })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targets"]["protein"], 154);
    }

    #[tokio::test]
    async fn rejects_zero_age() {
        let mut profile = profile_json();
        profile["age"] = json!(0);
        let (status, _) = post_targets(json!({ "profile": profile })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn check_profile_rejects_non_positive_height() {
        let mut profile: UserProfile = serde_json::from_value(profile_json()).unwrap();
        profile.height = 0.0;
        assert!(check_profile(&profile, None).is_err());
        profile.height = 175.0;
        assert!(check_profile(&profile, Some(-3.0)).is_err());
        assert!(check_profile(&profile, Some(70.0)).is_ok());
    }
}
