//! OpenAI-compatible vision provider
//!
//! Each port operation is a single chat completion: one fixed prompt, one
//! image URL, and a JSON object back. The prompts pin the reply shape so
//! the model output can be deserialized straight into the domain types.

use std::time::Duration;

use application::{ApplicationError, VisionPort};
use async_trait::async_trait;
use domain::{
    AmenityDetection, DetectedAmenity, ImageAnalysis, RoomConditionAssessment, RoomQuality,
    Sentiment,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::config::VisionConfig;
use crate::error::VisionError;

const ANALYZE_PROMPT: &str = "You are analyzing a photo a hotel guest sent to the front desk. \
Reply with a JSON object only: {\"description\": string, \"objects\": [string], \
\"sentiment\": \"positive\"|\"neutral\"|\"negative\", \"insights\": [string], \
\"confidence\": number between 0 and 1}. Insights are short action items for staff.";

const CONDITION_PROMPT: &str = "You are a housekeeping inspector assessing a hotel room photo. \
Reply with a JSON object only: {\"cleanliness\": integer 0-10, \"issues\": [string], \
\"recommendations\": [string]}. 10 is spotless, 0 is unusable.";

const AMENITIES_PROMPT: &str = "You are cataloguing the amenities visible in a hotel room photo. \
Reply with a JSON object only: {\"amenities\": [{\"name\": string, \"confidence\": number \
between 0 and 1, \"location\": string or null}], \"room_type\": string, \
\"quality\": \"luxury\"|\"standard\"|\"basic\"}.";

/// Vision provider backed by an OpenAI-compatible chat API
#[derive(Debug, Clone)]
pub struct OpenAiVisionProvider {
    client: Client,
    config: VisionConfig,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    code: Option<String>,
}

/// Model reply for general analysis
#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    description: String,
    #[serde(default)]
    objects: Vec<String>,
    #[serde(default)]
    sentiment: Sentiment,
    #[serde(default)]
    insights: Vec<String>,
    #[serde(default)]
    confidence: f64,
}

/// Model reply for room condition
#[derive(Debug, Deserialize)]
struct ConditionPayload {
    cleanliness: f64,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

/// Model reply for amenity detection
#[derive(Debug, Deserialize)]
struct AmenitiesPayload {
    #[serde(default)]
    amenities: Vec<AmenityPayload>,
    room_type: String,
    #[serde(default = "default_quality")]
    quality: RoomQuality,
}

#[derive(Debug, Deserialize)]
struct AmenityPayload {
    name: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    location: Option<String>,
}

const fn default_quality() -> RoomQuality {
    RoomQuality::Unknown
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    max_tokens: u32,
    response_format: serde_json::Value,
}

impl OpenAiVisionProvider {
    /// Create a new vision provider
    ///
    /// # Errors
    ///
    /// Returns `VisionError::Configuration` if the configuration is invalid.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        config.validate().map_err(VisionError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| VisionError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Run one prompt + image completion and return the model's text reply
    async fn complete(&self, prompt: &str, image_url: &str) -> Result<String, VisionError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": image_url } }
                ]
            })],
            max_tokens: self.config.max_tokens,
            response_format: json!({ "type": "json_object" }),
        };

        debug!(model = %self.config.model, "Requesting image analysis");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.api_key())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_body) {
                return match api_error.error.code.as_deref() {
                    Some("rate_limit_exceeded") => Err(VisionError::RateLimited),
                    _ => Err(VisionError::AnalysisFailed(api_error.error.message)),
                };
            }

            return Err(VisionError::AnalysisFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| VisionError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| VisionError::InvalidResponse("Reply has no choices".to_string()))
    }

    /// Parse the model's reply as JSON, tolerating markdown code fences
    fn parse_payload<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, VisionError> {
        let trimmed = content.trim();
        let inner = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|rest| rest.strip_suffix("```"))
            .unwrap_or(trimmed);

        serde_json::from_str(inner.trim())
            .map_err(|e| VisionError::InvalidResponse(format!("Malformed analysis JSON: {e}")))
    }

    async fn run_analysis(
        &self,
        image_url: &str,
        content_hint: Option<&str>,
    ) -> Result<ImageAnalysis, VisionError> {
        let prompt = match content_hint {
            Some(hint) => format!("{ANALYZE_PROMPT}\nThe guest says the photo shows: {hint}"),
            None => ANALYZE_PROMPT.to_string(),
        };

        let content = self.complete(&prompt, image_url).await?;
        let payload: AnalysisPayload = Self::parse_payload(&content)?;

        Ok(ImageAnalysis {
            description: payload.description,
            objects: payload.objects,
            sentiment: payload.sentiment,
            insights: payload.insights,
            confidence: payload.confidence.clamp(0.0, 1.0),
        })
    }

    async fn run_condition(&self, image_url: &str) -> Result<RoomConditionAssessment, VisionError> {
        let content = self.complete(CONDITION_PROMPT, image_url).await?;
        let payload: ConditionPayload = Self::parse_payload(&content)?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cleanliness = payload.cleanliness.round().clamp(0.0, 10.0) as u8;

        Ok(RoomConditionAssessment::from_score(
            cleanliness,
            payload.issues,
            payload.recommendations,
        ))
    }

    async fn run_amenities(&self, image_url: &str) -> Result<AmenityDetection, VisionError> {
        let content = self.complete(AMENITIES_PROMPT, image_url).await?;
        let payload: AmenitiesPayload = Self::parse_payload(&content)?;

        Ok(AmenityDetection {
            amenities: payload
                .amenities
                .into_iter()
                .map(|a| DetectedAmenity {
                    name: a.name,
                    confidence: a.confidence.clamp(0.0, 1.0),
                    location: a.location,
                })
                .collect(),
            room_type: payload.room_type,
            quality: payload.quality,
        })
    }

    async fn check_availability(&self) -> bool {
        let models_url = format!("{}/models", self.config.base_url);

        match self
            .client
            .get(&models_url)
            .bearer_auth(self.api_key())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Vision availability check failed: {}", e);
                false
            },
        }
    }
}

#[async_trait]
impl VisionPort for OpenAiVisionProvider {
    #[instrument(skip(self))]
    async fn analyze_image(
        &self,
        image_url: &str,
        content_hint: Option<&str>,
    ) -> Result<ImageAnalysis, ApplicationError> {
        self.run_analysis(image_url, content_hint)
            .await
            .map_err(|e| ApplicationError::Provider(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn assess_room_condition(
        &self,
        image_url: &str,
    ) -> Result<RoomConditionAssessment, ApplicationError> {
        self.run_condition(image_url)
            .await
            .map_err(|e| ApplicationError::Provider(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn detect_amenities(
        &self,
        image_url: &str,
    ) -> Result<AmenityDetection, ApplicationError> {
        self.run_amenities(image_url)
            .await
            .map_err(|e| ApplicationError::Provider(e.to_string()))
    }

    async fn is_available(&self) -> bool {
        self.check_availability().await
    }
}
