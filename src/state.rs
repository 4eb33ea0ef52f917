use crate::config::AppConfig;
use crate::inference::{GeminiBackend, InferenceBackend};
use crate::meals::MealEstimator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub estimator: MealEstimator,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let backend = Arc::new(GeminiBackend::from_config(&config.inference)?) as Arc<dyn InferenceBackend>;
        Ok(Self::from_parts(config, backend))
    }

    pub fn from_parts(config: Arc<AppConfig>, backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            config,
            estimator: MealEstimator::new(backend),
        }
    }

    pub fn with_backend(self, backend: Arc<dyn InferenceBackend>) -> Self {
        Self::from_parts(self.config, backend)
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::inference::{InferenceRequest, TransportError};
        use async_trait::async_trait;

        struct FakeBackend;
        #[async_trait]
        impl InferenceBackend for FakeBackend {
            async fn generate_json(&self, _r: &InferenceRequest) -> Result<String, TransportError> {
                Ok(crate::meals::schema::sample_response().to_string())
            }
        }

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            inference: crate::config::InferenceConfig {
                api_key: "test".into(),
                model: "fake".into(),
                base_url: "http://fake.local".into(),
                timeout_secs: 5,
            },
            max_upload_bytes: 1024 * 1024,
        });

        Self::from_parts(config, Arc::new(FakeBackend))
    }
}
