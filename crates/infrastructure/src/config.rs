//! Application configuration
//!
//! One TOML file covers the whole system: database, gateway credentials,
//! messaging behavior, and the optional capability providers. Every field
//! has a default so a minimal file only needs the credentials.

use std::collections::HashMap;

use ai_speech::SpeechConfig;
use ai_vision::VisionConfig;
use application::{CommunicationServiceConfig, CostModel, TemplateRegistry};
use integration_gateway::GatewayClientConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// SQLite database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "guestflow.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Messaging gateway credentials and endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API access token
    #[serde(default)]
    pub api_key: String,
    /// Registered sender number
    #[serde(default)]
    pub sender: String,
    /// API base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_secs: u64,
}

const fn default_gateway_timeout() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sender: String::new(),
            base_url: None,
            timeout_secs: default_gateway_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Build the client configuration, keeping the client's default base
    /// URL unless overridden
    #[must_use]
    pub fn to_client_config(&self) -> GatewayClientConfig {
        let mut config = GatewayClientConfig {
            api_key: self.api_key.clone(),
            sender: self.sender.clone(),
            timeout_secs: self.timeout_secs,
            ..Default::default()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        config
    }
}

/// Messaging behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Country code prepended to local numbers without one
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
    /// Base cost per 160-character segment
    #[serde(default = "default_base_cost")]
    pub base_cost_per_segment: f64,
    /// Flat surcharge for media attachments
    #[serde(default = "default_media_surcharge")]
    pub media_surcharge: f64,
    /// Upper bound on one audit write in milliseconds
    #[serde(default = "default_audit_timeout")]
    pub audit_write_timeout_ms: u64,
}

fn default_country_code() -> String {
    "264".to_string()
}

const fn default_base_cost() -> f64 {
    0.005
}

const fn default_media_surcharge() -> f64 {
    0.01
}

const fn default_audit_timeout() -> u64 {
    2_000
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
            base_cost_per_segment: default_base_cost(),
            media_surcharge: default_media_surcharge(),
            audit_write_timeout_ms: default_audit_timeout(),
        }
    }
}

impl MessagingConfig {
    /// Cost model derived from the configured rates
    #[must_use]
    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.base_cost_per_segment, self.media_surcharge)
    }

    /// Orchestrator tunables derived from this section
    #[must_use]
    pub fn to_service_config(&self) -> CommunicationServiceConfig {
        CommunicationServiceConfig {
            audit_write_timeout_ms: self.audit_write_timeout_ms,
            default_country_code: Some(self.default_country_code.clone()),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    /// Speech providers; absent means voice processing is disabled
    #[serde(default)]
    pub speech: Option<SpeechConfig>,
    /// Vision provider; absent means image analysis is disabled
    #[serde(default)]
    pub vision: Option<VisionConfig>,
    /// Extra message templates, merged over the built-in set
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        info!(path = %path, "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Template registry: the built-in set plus configured extras, which
    /// may override a built-in by reusing its name
    #[must_use]
    pub fn template_registry(&self) -> TemplateRegistry {
        let mut registry = TemplateRegistry::with_builtins();
        for (name, body) in &self.templates {
            registry.register(name, body);
        }
        registry
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.api_key.is_empty() {
            return Err(ConfigError::Invalid("gateway.api_key is required".to_string()));
        }
        if self.gateway.sender.is_empty() {
            return Err(ConfigError::Invalid("gateway.sender is required".to_string()));
        }
        if self.messaging.default_country_code.is_empty()
            || !self
                .messaging
                .default_country_code
                .chars()
                .all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(
                "messaging.default_country_code must be digits".to_string(),
            ));
        }
        if self.messaging.base_cost_per_segment < 0.0 || self.messaging.media_surcharge < 0.0 {
            return Err(ConfigError::Invalid(
                "messaging costs must not be negative".to_string(),
            ));
        }
        if let Some(speech) = &self.speech {
            speech.validate().map_err(ConfigError::Invalid)?;
        }
        if let Some(vision) = &self.vision {
            vision.validate().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }
}
