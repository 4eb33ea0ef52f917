use thiserror::Error;

use crate::inference::TransportError;

#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("response does not match the meal analysis schema: {0}")]
    SchemaValidation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl From<serde_json::Error> for EstimationError {
    fn from(e: serde_json::Error) -> Self {
        EstimationError::SchemaValidation(e.to_string())
    }
}
