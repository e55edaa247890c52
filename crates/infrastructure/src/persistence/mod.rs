//! SQLite persistence

pub mod audit_sink;
pub mod connection;
pub mod migrations;
