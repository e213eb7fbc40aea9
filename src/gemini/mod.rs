pub mod credentials;
pub mod image_client;
pub mod wire;

use crate::{
    builder::{build_request, GenerationOptions},
    config::{Config, GeminiConfig, VariationPolicy},
    error::Result,
    variations::{CancelFlag, TokioSleeper, VariationOrchestrator, VariationOutcome},
};
use std::sync::Arc;

pub use credentials::{CredentialProvider, EnvCredentials, StaticCredentials};
pub use image_client::ImageClient;

/// Entry point tying the image client to the variation policy.
#[derive(Clone)]
pub struct GeminiStudio {
    image_client: ImageClient,
    policy: VariationPolicy,
}

impl GeminiStudio {
    /// Uses the configured key when present, otherwise reads the
    /// environment on every call.
    pub fn new(gemini_config: GeminiConfig) -> Result<Self> {
        let credentials: Arc<dyn CredentialProvider> = match &gemini_config.api_key {
            Some(key) => Arc::new(StaticCredentials::new(key.clone())),
            None => Arc::new(EnvCredentials),
        };
        Self::with_credentials(gemini_config, credentials)
    }

    pub fn with_credentials(
        gemini_config: GeminiConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        Ok(Self {
            image_client: ImageClient::new(&gemini_config, credentials)?,
            policy: VariationPolicy::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.gemini.clone())?.with_policy(config.policy.clone()))
    }

    pub fn with_policy(mut self, policy: VariationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn policy(&self) -> &VariationPolicy {
        &self.policy
    }

    /// Validates the options, builds the request and runs all slots.
    pub async fn generate_variations(&self, options: GenerationOptions) -> Result<VariationOutcome> {
        self.generate_variations_with_cancel(options, CancelFlag::new())
            .await
    }

    pub async fn generate_variations_with_cancel(
        &self,
        options: GenerationOptions,
        cancel: CancelFlag,
    ) -> Result<VariationOutcome> {
        options.validate()?;
        self.image_client.check_credentials()?;
        let request = build_request(options);
        let orchestrator =
            VariationOrchestrator::new(&self.image_client, TokioSleeper, self.policy.clone());
        orchestrator.generate_with_cancel(&request, &cancel).await
    }
}
