//! Append-only audit log records
//!
//! One `CommunicationLogRecord` per send attempt and one
//! `MultimodalProcessingLogRecord` per capability-provider invocation,
//! written regardless of outcome. Rows are created and persisted exactly
//! once and never updated in place; later status transitions (sent →
//! delivered) come from status polls, not log mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters of message content kept in a log record
pub const CONTENT_PREVIEW_CHARS: usize = 255;

/// Outcome recorded for a send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStatus {
    Sent,
    Failed,
}

impl CommunicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for CommunicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row per communication attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationLogRecord {
    /// Record identifier
    pub id: Uuid,
    /// Recipient phone number
    pub recipient: String,
    /// First [`CONTENT_PREVIEW_CHARS`] characters of the message body
    pub content_preview: String,
    /// Outcome of the attempt
    pub status: CommunicationStatus,
    /// Wrapped error message, present only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Gateway-assigned message id, present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_message_id: Option<String>,
    /// Computed delivery cost
    pub cost: f64,
    /// Whether the message carried a media attachment
    pub has_media: bool,
    /// Template the body was rendered from, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    /// When the attempt was made
    pub timestamp: DateTime<Utc>,
}

impl CommunicationLogRecord {
    /// Record a successful send
    pub fn sent(
        recipient: impl Into<String>,
        content: &str,
        external_message_id: impl Into<String>,
        cost: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            content_preview: preview(content),
            status: CommunicationStatus::Sent,
            error: None,
            external_message_id: Some(external_message_id.into()),
            cost,
            has_media: false,
            template_name: None,
            timestamp: Utc::now(),
        }
    }

    /// Record a failed send
    pub fn failed(recipient: impl Into<String>, content: &str, error: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            content_preview: preview(content),
            status: CommunicationStatus::Failed,
            error: Some(error.into()),
            external_message_id: None,
            cost: 0.0,
            has_media: false,
            template_name: None,
            timestamp: Utc::now(),
        }
    }

    /// Flag the media attachment
    #[must_use]
    pub const fn with_media(mut self, has_media: bool) -> Self {
        self.has_media = has_media;
        self
    }

    /// Record the source template
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }
}

/// Kind of capability-provider invocation
///
/// Closed enumeration dispatched through explicit matches; each variant
/// carries its own typed input/output pair at the orchestrator level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingType {
    SpeechToText,
    TextToSpeech,
    ImageAnalysis,
    RoomConditionAnalysis,
    AmenityDetection,
}

impl ProcessingType {
    /// Stable snake_case identifier used in persisted records
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpeechToText => "speech_to_text",
            Self::TextToSpeech => "text_to_speech",
            Self::ImageAnalysis => "image_analysis",
            Self::RoomConditionAnalysis => "room_condition_analysis",
            Self::AmenityDetection => "amenity_detection",
        }
    }
}

impl std::fmt::Display for ProcessingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row per capability-provider invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalProcessingLogRecord {
    /// Record identifier
    pub id: Uuid,
    /// What kind of processing was attempted
    pub processing_type: ProcessingType,
    /// Input reference (URL or text preview)
    pub input_ref: String,
    /// Output reference (text preview or URL), present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_ref: Option<String>,
    /// Whether the provider call succeeded
    pub success: bool,
    /// Provider error message, present only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Type-specific metadata (sentiment, insights, detected amenities, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// When the invocation happened
    pub timestamp: DateTime<Utc>,
}

impl MultimodalProcessingLogRecord {
    /// Record a successful provider invocation
    pub fn succeeded(
        processing_type: ProcessingType,
        input_ref: &str,
        output_ref: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            processing_type,
            input_ref: preview(input_ref),
            output_ref: Some(preview(output_ref)),
            success: true,
            error: None,
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Record a failed provider invocation
    pub fn failed(
        processing_type: ProcessingType,
        input_ref: &str,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            processing_type,
            input_ref: preview(input_ref),
            output_ref: None,
            success: false,
            error: Some(error.into()),
            metadata: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach type-specific metadata from a serializable value
    #[must_use]
    pub fn with_metadata<T: Serialize>(mut self, metadata: &T) -> Self {
        self.metadata = serde_json::to_value(metadata).ok();
        self
    }
}

/// Truncate content to the logged preview length on a char boundary
fn preview(content: &str) -> String {
    content.chars().take(CONTENT_PREVIEW_CHARS).collect()
}
