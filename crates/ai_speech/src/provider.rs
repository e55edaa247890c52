//! OpenAI-compatible speech provider
//!
//! Implements [`SpeechToTextPort`] with Whisper-style transcription and
//! [`TextToSpeechPort`] with the TTS endpoint. Guest voice notes arrive as
//! hosted URLs, so transcription first downloads the audio and then uploads
//! it as a multipart form.

use std::time::Duration;

use application::{ApplicationError, SpeechToTextPort, TextToSpeechPort};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;

/// Speech provider backed by an OpenAI-compatible audio API
#[derive(Debug, Clone)]
pub struct OpenAiSpeechProvider {
    client: Client,
    config: SpeechConfig,
}

/// Whisper transcription response
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}

/// TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
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

impl OpenAiSpeechProvider {
    /// Create a new speech provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    fn stt_url(&self) -> String {
        format!("{}/audio/transcriptions", self.config.base_url)
    }

    fn tts_url(&self) -> String {
        format!("{}/audio/speech", self.config.base_url)
    }

    /// Filename to attach to the multipart upload, derived from the URL path
    fn filename_for(audio_url: &str) -> String {
        let name = audio_url
            .rsplit('/')
            .next()
            .map(|last| last.split(['?', '#']).next().unwrap_or(last))
            .filter(|last| !last.is_empty());
        match name {
            Some(last) if last.contains('.') => last.to_string(),
            _ => "audio.ogg".to_string(),
        }
    }

    /// Download a hosted voice note
    ///
    /// The size limit is enforced on the bytes actually received, not just
    /// the Content-Length header, so chunked responses cannot exceed it.
    #[instrument(skip(self))]
    async fn download_audio(&self, audio_url: &str) -> Result<Bytes, SpeechError> {
        let mut response = self.client.get(audio_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::AudioDownloadFailed(format!("HTTP {status}")));
        }

        if let Some(length) = response.content_length() {
            if length > self.config.max_audio_bytes {
                return Err(SpeechError::InvalidAudio(format!(
                    "Audio is {length} bytes, limit is {}",
                    self.config.max_audio_bytes
                )));
            }
        }

        let mut data = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SpeechError::AudioDownloadFailed(e.to_string()))?
        {
            if data.len() as u64 + chunk.len() as u64 > self.config.max_audio_bytes {
                return Err(SpeechError::InvalidAudio(format!(
                    "Audio exceeds the {} byte limit",
                    self.config.max_audio_bytes
                )));
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        Ok(data.freeze())
    }

    async fn transcribe_audio(&self, audio_url: &str) -> Result<String, SpeechError> {
        let data = self.download_audio(audio_url).await?;
        let filename = Self::filename_for(audio_url);

        debug!(audio_size = data.len(), %filename, "Transcribing audio");

        let file_part = Part::bytes(data.to_vec()).file_name(filename);
        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.stt_model.clone());

        let response = self
            .client
            .post(self.stt_url())
            .bearer_auth(self.api_key())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_body) {
                return match api_error.error.code.as_deref() {
                    Some("rate_limit_exceeded") => Err(SpeechError::RateLimited),
                    Some("model_not_found") => Err(SpeechError::ModelNotAvailable(
                        self.config.stt_model.clone(),
                    )),
                    _ => Err(SpeechError::TranscriptionFailed(api_error.error.message)),
                };
            }

            return Err(SpeechError::TranscriptionFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let whisper_response: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(text_len = whisper_response.text.len(), "Transcription complete");

        Ok(whisper_response.text)
    }

    async fn synthesize_audio(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        if text.is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        // The TTS endpoint caps input at 4096 characters
        if text.len() > 4096 {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {} characters exceeds 4096 limit",
                text.len()
            )));
        }

        let request = TtsRequest {
            model: &self.config.tts_model,
            input: text,
            voice: &self.config.voice,
            speed: if (self.config.speed - 1.0).abs() < f32::EPSILON {
                None
            } else {
                Some(self.config.speed)
            },
        };

        let response = self
            .client
            .post(self.tts_url())
            .bearer_auth(self.api_key())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_body) {
                return match api_error.error.code.as_deref() {
                    Some("rate_limit_exceeded") => Err(SpeechError::RateLimited),
                    Some("model_not_found") => Err(SpeechError::ModelNotAvailable(
                        self.config.tts_model.clone(),
                    )),
                    _ => Err(SpeechError::SynthesisFailed(api_error.error.message)),
                };
            }

            return Err(SpeechError::SynthesisFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        debug!(audio_size = audio_bytes.len(), "Speech synthesis complete");

        Ok(audio_bytes.to_vec())
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
                warn!("Speech availability check failed: {}", e);
                false
            },
        }
    }
}

#[async_trait]
impl SpeechToTextPort for OpenAiSpeechProvider {
    #[instrument(skip(self))]
    async fn transcribe(&self, audio_url: &str) -> Result<String, ApplicationError> {
        self.transcribe_audio(audio_url)
            .await
            .map_err(|e| ApplicationError::Provider(e.to_string()))
    }

    async fn is_available(&self) -> bool {
        self.check_availability().await
    }
}

#[async_trait]
impl TextToSpeechPort for OpenAiSpeechProvider {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ApplicationError> {
        self.synthesize_audio(text)
            .await
            .map_err(|e| ApplicationError::Provider(e.to_string()))
    }

    async fn is_available(&self) -> bool {
        self.check_availability().await
    }
}
