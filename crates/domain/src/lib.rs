//! Domain layer for the guest-communication engine
//!
//! Pure types and invariants, no I/O:
//! - Outbound messages and send results
//! - Append-only audit log records
//! - Image-analysis assessments (room condition, amenities)
//! - Phone number value object with E.164 normalization

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::communication::{
    ButtonAction, CommunicationResult, DeliveryStatus, MessageButton, OutboundMessage,
};
pub use entities::log_record::{
    CommunicationLogRecord, CommunicationStatus, MultimodalProcessingLogRecord, ProcessingType,
};
pub use entities::vision::{
    AmenityDetection, DetectedAmenity, ImageAnalysis, RoomCondition, RoomConditionAssessment,
    RoomQuality, Sentiment,
};
pub use errors::DomainError;
pub use value_objects::phone_number::PhoneNumber;
