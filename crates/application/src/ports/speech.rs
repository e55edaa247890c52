//! Ports for speech capability providers
//!
//! Narrow request/response contracts: the provider's internal protocol is
//! out of scope. Each provider may fail independently and is invoked on
//! demand, never required for a plain text send.

use async_trait::async_trait;

use crate::error::ApplicationError;

/// Port for Speech-to-Text providers
#[async_trait]
pub trait SpeechToTextPort: Send + Sync {
    /// Transcribe the audio hosted at `audio_url` into text
    async fn transcribe(&self, audio_url: &str) -> Result<String, ApplicationError>;

    /// Check if the provider is reachable
    async fn is_available(&self) -> bool;
}

/// Port for Text-to-Speech providers
#[async_trait]
pub trait TextToSpeechPort: Send + Sync {
    /// Synthesize `text` into an audio byte buffer
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ApplicationError>;

    /// Check if the provider is reachable
    async fn is_available(&self) -> bool;
}
