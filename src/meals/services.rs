use std::{future::Future, sync::Arc};

use tracing::{debug, info, instrument, warn};

use super::dto::MealAnalysis;
use super::error::EstimationError;
use super::schema::{meal_analysis_schema, parse_meal_analysis};
use crate::images::UploadItem;
use crate::inference::{InferenceBackend, InferenceRequest};

pub const INSTRUCTION: &str = "\
You are a nutrition analyst. Look at the meal photo and identify every visible food item.
For each item:
- give a short name and a portion description, estimating size from visual cues such as plate size, utensils and hands;
- give conservative minimum and maximum estimates for calories (kcal), protein (g), carbs (g) and fat (g);
- when you can judge them, also give min/max for sugar (g), fiber (g) and sodium (mg), always as a pair.
Also estimate meal-level totals as ranges for calories and protein.
Every minimum must be less than or equal to its maximum and no value may be negative.
Set confidence for the whole meal:
- \"high\" for a clear photo of a single item or a standard portion;
- \"medium\" for a partial view or mixed dishes;
- \"low\" for poor lighting, ambiguous items or complex multi-component dishes.
Optionally add a few short, practical tips about the meal.
If no food is visible, return an empty foods list with zero totals and low confidence.
Respond only with JSON matching the provided schema.";

/// Photo → [`MealAnalysis`] through a single inference call.
#[derive(Clone)]
pub struct MealEstimator {
    backend: Arc<dyn InferenceBackend>,
}

impl MealEstimator {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// Runs one estimation. Dropping the returned future abandons the request.
    #[instrument(skip(self, image), fields(image_bytes = image.body.len(), mime = %image.content_type))]
    pub async fn analyze_meal_photo(&self, image: UploadItem) -> Result<MealAnalysis, EstimationError> {
        if image.body.is_empty() {
            return Err(EstimationError::InvalidImage("image is empty".into()));
        }

        let request = InferenceRequest {
            instruction: INSTRUCTION.to_string(),
            image: image.body,
            mime_type: image.content_type,
            output_schema: meal_analysis_schema(),
        };

        let raw = self.backend.generate_json(&request).await.map_err(|e| {
            warn!(error = %e, "inference call failed");
            EstimationError::from(e)
        })?;
        debug!(response_len = raw.len(), "model output received");

        let analysis = parse_meal_analysis(&raw).map_err(|e| {
            warn!(error = %e, "model output rejected");
            e
        })?;

        info!(
            foods = analysis.foods.len(),
            confidence = ?analysis.confidence,
            "meal analysed"
        );
        Ok(analysis)
    }

    /// Like [`Self::analyze_meal_photo`], abandoned as soon as `cancel` resolves.
    pub async fn analyze_meal_photo_until<C>(
        &self,
        image: UploadItem,
        cancel: C,
    ) -> Result<MealAnalysis, EstimationError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                info!("meal analysis cancelled");
                Err(EstimationError::Cancelled)
            }
            res = self.analyze_meal_photo(image) => res,
        }
    }
}
