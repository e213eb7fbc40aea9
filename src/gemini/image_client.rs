use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    gemini::{
        credentials::CredentialProvider,
        wire::{
            Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
            GoogleErrorResponse, ImageConfig, Part,
        },
    },
    models::{GeneratedImage, GenerationRequest},
    variations::ImageInvoker,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Issues single `generateContent` calls. Retrying is the caller's business.
#[derive(Clone)]
pub struct ImageClient {
    http: Client,
    base_url: String,
    model: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ImageClient {
    pub fn new(config: &GeminiConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StudioError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            credentials,
        })
    }

    /// Fails fast when no usable key is configured.
    pub fn check_credentials(&self) -> Result<()> {
        self.credentials.api_key().map(|_| ())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    pub fn build_payload(request: &GenerationRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(request.images().len() + 1);
        parts.push(Part::text(request.prompt()));
        for image in request.images() {
            parts.push(Part::inline(image.mime_type(), image.to_base64()));
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(request.system_instruction())],
            },
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: ImageConfig {
                    aspect_ratio: request.aspect_ratio().service_ratio().to_string(),
                },
            },
        }
    }

    /// One call. `Ok(None)` means the service answered but returned no image.
    pub async fn generate_once(&self, request: &GenerationRequest) -> Result<Option<GeneratedImage>> {
        let api_key = self.credentials.api_key()?;
        let payload = Self::build_payload(request);

        log::debug!(
            "Calling {} with {} image(s), aspect ratio {}",
            self.model,
            request.images().len(),
            request.aspect_ratio().service_ratio()
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status.as_u16(), &body));
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| StudioError::ResponseError(format!("unreadable response: {}", e)))?;

        match parsed.first_image() {
            Some(inline) => {
                let image = GeneratedImage::from_base64(&inline.data, inline.mime_type.as_deref())?;
                log::debug!("Received {} bytes of {}", image.data.len(), image.mime_type);
                Ok(Some(image))
            }
            None => {
                log::warn!("Response from {} contained no image data", self.model);
                Ok(None)
            }
        }
    }
}

fn service_error(status: u16, body: &str) -> StudioError {
    match serde_json::from_str::<GoogleErrorResponse>(body) {
        Ok(parsed) => StudioError::Service {
            status: parsed.error.code.unwrap_or(status),
            code: parsed.error.status,
            message: parsed.error.message,
        },
        Err(_) => StudioError::Service {
            status,
            code: None,
            message: if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[async_trait]
impl ImageInvoker for ImageClient {
    async fn invoke(&self, request: &GenerationRequest) -> Result<Option<GeneratedImage>> {
        self.generate_once(request).await
    }
}
