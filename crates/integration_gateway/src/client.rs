//! Gateway client for sending messages
//!
//! Talks to the messaging gateway's REST API and adapts its responses to
//! the application's port contract: send attempts always come back as a
//! [`CommunicationResult`], never as an error.

use std::time::Duration;

use application::{ApplicationError, CostModel, MessageGatewayPort};
use async_trait::async_trait;
use domain::{CommunicationResult, DeliveryStatus, OutboundMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Channel identifier reported on every result
const PROVIDER: &str = "whatsapp";

/// Account status the gateway reports for a usable account
const ACCOUNT_ACTIVE: &str = "active";

/// Gateway API errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("API error: {code} - {message}")]
    Api { code: i32, message: String },

    #[error("Missing configuration: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct GatewayClientConfig {
    /// API access token
    pub api_key: String,
    /// Registered sender number messages go out from
    pub sender: String,
    /// API base URL; overridable so tests can point at a local server
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GatewayClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sender: String::new(),
            base_url: "https://gateway.example-messaging.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Client for the messaging gateway REST API
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayClientConfig,
    cost_model: CostModel,
}

/// Message send request
#[derive(Debug, Serialize)]
struct SendMessageRequest {
    to: String,
    from: String,
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_url: Option<String>,
}

/// API response for a sent message
#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    message_id: String,
    /// Billing segments the gateway counted; recomputed locally if absent
    segments: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct MessageStatusResponse {
    status: String,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: i32,
    message: String,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayClientConfig) -> Result<Self, GatewayError> {
        Self::with_cost_model(config, CostModel::default())
    }

    /// Create a new gateway client with an explicit cost model
    pub fn with_cost_model(
        config: GatewayClientConfig,
        cost_model: CostModel,
    ) -> Result<Self, GatewayError> {
        if config.api_key.is_empty() {
            return Err(GatewayError::Configuration("api_key is required".to_string()));
        }
        if config.sender.is_empty() {
            return Err(GatewayError::Configuration("sender is required".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            cost_model,
        })
    }

    /// Dispatch one message to the gateway
    #[instrument(skip(self, message), fields(to = %message.recipient))]
    async fn dispatch(&self, message: &OutboundMessage) -> Result<SendMessageResponse, GatewayError> {
        let request = SendMessageRequest {
            to: message.recipient.clone(),
            from: self.config.sender.clone(),
            body: message.content.clone(),
            media_url: message.media_url.clone(),
        };

        debug!(body_len = message.content.len(), has_media = message.has_media(), "Sending message");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: ApiErrorResponse = response.json().await?;
            Err(GatewayError::Api {
                code: error.error.code,
                message: error.error.message,
            })
        }
    }
}

#[async_trait]
impl MessageGatewayPort for GatewayClient {
    /// Empty recipient or content fails immediately with a validation
    /// error; the gateway is never contacted for such a message
    async fn send(&self, message: &OutboundMessage) -> CommunicationResult {
        if message.recipient.trim().is_empty() {
            return CommunicationResult::failed(
                PROVIDER,
                ApplicationError::Validation("recipient is required".to_string()).to_string(),
            );
        }
        if message.content.trim().is_empty() {
            return CommunicationResult::failed(
                PROVIDER,
                ApplicationError::Validation("content is required".to_string()).to_string(),
            );
        }

        match self.dispatch(message).await {
            Ok(response) => {
                let segments = response
                    .segments
                    .unwrap_or_else(|| CostModel::segments_for(&message.content));
                let cost = self.cost_model.cost(segments, message.has_media());
                CommunicationResult::sent(PROVIDER, response.message_id, cost)
            },
            Err(err) => {
                warn!(error = %err, "Gateway send failed");
                CommunicationResult::failed(PROVIDER, err.to_string())
            },
        }
    }

    /// Read-only account check; any gateway status other than "active"
    /// (or any transport error) reads as unusable
    #[instrument(skip(self))]
    async fn verify_connection(&self) -> bool {
        let response = self
            .client
            .get(format!("{}/v1/account", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => res
                .json::<AccountResponse>()
                .await
                .is_ok_and(|account| account.status == ACCOUNT_ACTIVE),
            Ok(res) => {
                debug!(status = %res.status(), "Account check rejected");
                false
            },
            Err(err) => {
                warn!(error = %err, "Account check failed");
                false
            },
        }
    }

    /// Delivery status lookup; unrecognized statuses and lookup errors
    /// both collapse to [`DeliveryStatus::Unknown`]
    #[instrument(skip(self))]
    async fn message_status(&self, message_id: &str) -> DeliveryStatus {
        let response = self
            .client
            .get(format!("{}/v1/messages/{message_id}", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => res
                .json::<MessageStatusResponse>()
                .await
                .map_or(DeliveryStatus::Unknown, |body| {
                    DeliveryStatus::from_gateway_str(&body.status)
                }),
            Ok(res) => {
                debug!(status = %res.status(), "Status lookup rejected");
                DeliveryStatus::Unknown
            },
            Err(err) => {
                warn!(error = %err, "Status lookup failed");
                DeliveryStatus::Unknown
            },
        }
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
