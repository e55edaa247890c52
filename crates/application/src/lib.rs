//! Application layer - guest-communication orchestration
//!
//! Defines the ports (traits) the integrations implement and the
//! `CommunicationService` orchestrator that coordinates them:
//! template rendering, the gateway send, cost accounting, capability
//! providers, and the always-written audit trail.

pub mod cost;
pub mod error;
pub mod fallback;
pub mod ports;
pub mod services;
pub mod templates;

pub use cost::CostModel;
pub use error::ApplicationError;
pub use fallback::{CapabilityFallback, fallback_for};
pub use ports::{
    AuditSinkPort, MessageGatewayPort, SpeechToTextPort, TextToSpeechPort, VisionPort,
};
pub use services::communication_service::{CommunicationService, CommunicationServiceConfig};
pub use templates::TemplateRegistry;
