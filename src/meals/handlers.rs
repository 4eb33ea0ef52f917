use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{AnalyzeMealBase64, AnalyzedMeal};
use super::error::EstimationError;
use crate::images::{decode_base64_image, UploadItem};
use crate::state::AppState;

const ESTIMATE_UNAVAILABLE: &str = "estimate unavailable, please retry or enter manually";
const FILE_FIELDS: [&str; 4] = ["file", "files", "files[]", "photo"];

pub fn analyze_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/meals/analyze", post(analyze_meal_multipart)) // multipart file
        .route("/meals/analyze/base64", post(analyze_meal_base64))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// POST /meals/analyze (multipart)
/// First field named file / files / files[] / photo is analysed.
#[instrument(skip(state, mp))]
pub async fn analyze_meal_multipart(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<AnalyzedMeal>, (StatusCode, String)> {
    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(bad_request)? {
        if !field.name().is_some_and(|n| FILE_FIELDS.iter().any(|f| *f == n)) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(bad_request)?;
        upload = Some(UploadItem::new(data, content_type.as_deref()));
        break;
    }
    let Some(upload) = upload else {
        return Err((StatusCode::BAD_REQUEST, "file is required".into()));
    };

    analyze(&state, upload).await
}

/// POST /meals/analyze/base64 { imageB64: "...", contentType?: "image/jpeg" }
#[instrument(skip(state, body))]
pub async fn analyze_meal_base64(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeMealBase64>,
) -> Result<Json<AnalyzedMeal>, (StatusCode, String)> {
    let (bytes, data_url_mime) = decode_base64_image(&body.image_b64)
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid base64".to_string()))?;
    let declared = body.content_type.or(data_url_mime);

    analyze(&state, UploadItem::new(bytes, declared.as_deref())).await
}

async fn analyze(
    state: &AppState,
    upload: UploadItem,
) -> Result<Json<AnalyzedMeal>, (StatusCode, String)> {
    let analysis = state
        .estimator
        .analyze_meal_photo(upload)
        .await
        .map_err(estimation_failure)?;
    Ok(Json(AnalyzedMeal::pending(analysis)))
}

fn estimation_failure(e: EstimationError) -> (StatusCode, String) {
    match e {
        EstimationError::InvalidImage(msg) => {
            warn!(reason = %msg, "invalid image");
            (StatusCode::BAD_REQUEST, msg)
        }
        EstimationError::SchemaValidation(_) => {
            error!(error = %e, "analysis rejected");
            (StatusCode::UNPROCESSABLE_ENTITY, ESTIMATE_UNAVAILABLE.into())
        }
        // handlers only run the uncancellable path; a disconnect drops the future instead
        EstimationError::Transport(_) | EstimationError::Cancelled => {
            error!(error = %e, "inference unavailable");
            (StatusCode::BAD_GATEWAY, ESTIMATE_UNAVAILABLE.into())
        }
    }
}

fn bad_request<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}
