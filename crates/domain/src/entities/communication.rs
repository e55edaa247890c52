//! Outbound messages and send results

use serde::{Deserialize, Serialize};

/// Action triggered when a guest taps a message button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// Dial a phone number
    Call,
    /// Open a URL
    Url,
}

/// A single button attached to an interactive message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageButton {
    /// Label shown to the guest
    pub text: String,
    /// What tapping the button does
    pub action: ButtonAction,
    /// Phone number or URL, depending on `action`
    pub value: String,
}

impl MessageButton {
    /// Create a call button
    pub fn call(text: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Call,
            value: number.into(),
        }
    }

    /// Create a URL button
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url,
            value: url.into(),
        }
    }
}

/// Input to a send operation
///
/// `recipient` and `content` must both be non-empty before any gateway call
/// is attempted; violating that is a local validation failure, never a
/// network round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient phone number
    pub recipient: String,
    /// Plain-text body, already template-expanded if applicable
    pub content: String,
    /// Optional media attachment URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    /// Template this message was rendered from, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    /// Interactive buttons, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<MessageButton>,
}

impl OutboundMessage {
    /// Create a plain text message
    pub fn text(recipient: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            content: content.into(),
            media_url: None,
            template_name: None,
            buttons: Vec::new(),
        }
    }

    /// Attach a media URL
    #[must_use]
    pub fn with_media(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    /// Record the template this message came from
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    /// Attach interactive buttons
    #[must_use]
    pub fn with_buttons(mut self, buttons: Vec<MessageButton>) -> Self {
        self.buttons = buttons;
        self
    }

    /// Whether this message carries a media attachment
    pub const fn has_media(&self) -> bool {
        self.media_url.is_some()
    }
}

/// Outcome of one send attempt
///
/// Constructed once per call and never mutated after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationResult {
    /// Whether the gateway accepted the message
    pub success: bool,
    /// Gateway-assigned identifier, present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Fixed channel identifier (e.g. "whatsapp")
    pub provider: String,
    /// Computed delivery cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Wrapped error message for operations staff, present only on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommunicationResult {
    /// Successful send with gateway message id and computed cost
    pub fn sent(provider: impl Into<String>, message_id: impl Into<String>, cost: f64) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            provider: provider.into(),
            cost: Some(cost),
            error: None,
        }
    }

    /// Failed send with a wrapped error message
    pub fn failed(provider: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            provider: provider.into(),
            cost: None,
            error: Some(error.into()),
        }
    }
}

/// Gateway-reported delivery status of a previously sent message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Queued,
    Sent,
    Delivered,
    Read,
    Failed,
    /// Sentinel for anything the gateway reports that we do not recognize,
    /// and for status lookups that error out
    Unknown,
}

impl DeliveryStatus {
    /// Parse a gateway status string, collapsing unrecognized values to
    /// [`Self::Unknown`]
    pub fn from_gateway_str(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "read" => Self::Read,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Stable string form, matching the gateway's wire vocabulary
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
