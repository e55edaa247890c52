//! AI Vision - image analysis providers
//!
//! Implements the application layer's [`application::VisionPort`] against
//! an OpenAI-compatible vision model: general image analysis, room
//! condition assessment, and amenity detection, each as one
//! prompt-per-operation chat completion returning structured JSON.

pub mod config;
pub mod error;
pub mod provider;

pub use config::VisionConfig;
pub use error::VisionError;
pub use provider::OpenAiVisionProvider;
