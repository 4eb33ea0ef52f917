//! Boundary to the vision model that turns a photo into structured JSON.
//!
//! The pipeline only knows about [`InferenceBackend`]; vendor clients live in
//! submodules.

pub mod gemini;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use gemini::GeminiBackend;

/// One instruction + image request constrained to an output schema.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub instruction: String,
    pub image: Bytes,
    pub mime_type: String,
    pub output_schema: serde_json::Value,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("inference request failed: {0}")]
    Request(String),
    #[error("inference request timed out")]
    Timeout,
    #[error("inference backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("inference backend refused the request: {0}")]
    Blocked(String),
    #[error("inference backend returned no content")]
    EmptyResponse,
}

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Sends `request` and returns the raw JSON text the model produced.
    async fn generate_json(&self, request: &InferenceRequest) -> Result<String, TransportError>;
}
