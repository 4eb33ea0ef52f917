//! Gemini `generateContent` client with inline image data and JSON output mode.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::{InferenceBackend, InferenceRequest, TransportError};
use crate::config::InferenceConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    candidate_count: u32,
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

pub struct GeminiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn from_config(cfg: &InferenceConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build inference http client")?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(request: &InferenceRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![
                    ContentPart::Text {
                        text: request.instruction.clone(),
                    },
                    ContentPart::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type.clone(),
                            data: STANDARD.encode(&request.image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                candidate_count: 1,
                response_mime_type: "application/json",
                response_schema: request.output_schema.clone(),
            },
        }
    }

    fn extract_text(response: GeminiResponse) -> Result<String, TransportError> {
        if let Some(err) = response.error {
            return Err(TransportError::Request(err.message));
        }
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(TransportError::Blocked(reason));
        }

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or(TransportError::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| match p {
                ContentPart::Text { text } => Some(text),
                ContentPart::InlineData { .. } => None,
            })
            .collect();

        if text.trim().is_empty() {
            if let Some(reason) = candidate.finish_reason {
                warn!(finish_reason = %reason, "candidate finished without text");
            }
            return Err(TransportError::EmptyResponse);
        }
        Ok(text)
    }

    fn map_status(status: u16, body: &str) -> TransportError {
        let message = serde_json::from_str::<GeminiResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| body.to_string(), |e| e.message);
        TransportError::Status { status, message }
    }
}

fn map_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e.to_string())
    }
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    #[instrument(skip(self, request), fields(model = %self.model, image_bytes = request.image.len()))]
    async fn generate_json(&self, request: &InferenceRequest) -> Result<String, TransportError> {
        let body = Self::build_request(request);
        debug!("sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest)?;

        if !status.is_success() {
            error!(%status, "inference backend error");
            return Err(Self::map_status(status.as_u16(), &text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "unreadable generateContent envelope");
            TransportError::Request(format!("unreadable response envelope: {e}"))
        })?;

        let out = Self::extract_text(parsed)?;
        debug!(response_len = out.len(), "received model output");
        Ok(out)
    }
}
