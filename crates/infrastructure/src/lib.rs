//! Infrastructure layer
//!
//! Wiring for the outer edge of the system: application configuration,
//! the SQLite-backed audit trail, and tracing setup.

pub mod config;
pub mod persistence;
pub mod telemetry;

pub use config::{AppConfig, DatabaseConfig, MessagingConfig};
pub use persistence::audit_sink::SqliteAuditSink;
pub use persistence::connection::{ConnectionPool, DatabaseError, create_pool};
