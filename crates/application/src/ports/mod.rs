//! Ports (traits) implemented by the integration and infrastructure crates

pub mod audit_sink;
pub mod message_gateway;
pub mod speech;
pub mod vision;

pub use audit_sink::AuditSinkPort;
pub use message_gateway::MessageGatewayPort;
pub use speech::{SpeechToTextPort, TextToSpeechPort};
pub use vision::VisionPort;
