//! Application-level errors
//!
//! One taxonomy for the whole orchestration flow. `Validation` and
//! `TemplateNotFound` never reach the gateway; `Logging` is always
//! suppressed at the call site and never changes a primary result.

use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Missing recipient/content - caught before any gateway call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown template name, listing known templates for diagnosability
    #[error("Template not found: {name}; known templates: [{}]", known.join(", "))]
    TemplateNotFound {
        /// The requested template name
        name: String,
        /// All registered template names, sorted
        known: Vec<String>,
    },

    /// Non-2xx or malformed gateway response, wrapped
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Capability-provider failure, wrapped
    #[error("Provider error: {0}")]
    Provider(String),

    /// Audit sink write failure - suppressed, never surfaced to callers
    #[error("Logging error: {0}")]
    Logging(String),

    /// A gateway or provider call exceeded its bounded timeout
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),
}
