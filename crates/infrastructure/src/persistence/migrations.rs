//! Database migrations
//!
//! Manages the audit schema version. Migrations run at pool creation and
//! are idempotent; the audit tables are append-only by convention, so no
//! migration ever rewrites existing rows.

use rusqlite::Connection;
use tracing::{debug, error, info};

use super::connection::DatabaseError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_schema_version(conn)?;

    if current_version < SCHEMA_VERSION {
        info!(
            from_version = current_version,
            to_version = SCHEMA_VERSION,
            "Running database migrations"
        );

        if current_version < 1 {
            if let Err(e) = migrate_v1(conn) {
                error!(version = 1, error = %e, "Migration V001 (audit tables) failed");
                return Err(e);
            }
        }

        set_schema_version(conn, SCHEMA_VERSION)?;
        info!(version = SCHEMA_VERSION, "Database migrations complete");
    } else {
        debug!(version = current_version, "Database schema is up to date");
    }

    Ok(())
}

/// Get current schema version
fn get_schema_version(conn: &Connection) -> Result<i32, DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

/// Set schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration to version 1: Audit tables
fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V001: Audit tables");

    conn.execute_batch(
        "
        -- One row per communication attempt, success or failure
        CREATE TABLE IF NOT EXISTS communication_log (
            id TEXT PRIMARY KEY,
            recipient TEXT NOT NULL,
            content_preview TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('sent', 'failed')),
            error TEXT,
            external_message_id TEXT,
            cost REAL NOT NULL DEFAULT 0,
            has_media INTEGER NOT NULL DEFAULT 0,
            template_name TEXT,
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_communication_log_recipient
            ON communication_log(recipient);
        CREATE INDEX IF NOT EXISTS idx_communication_log_timestamp
            ON communication_log(timestamp);

        -- One row per capability-provider invocation
        CREATE TABLE IF NOT EXISTS processing_log (
            id TEXT PRIMARY KEY,
            processing_type TEXT NOT NULL,
            input_ref TEXT NOT NULL,
            output_ref TEXT,
            success INTEGER NOT NULL,
            error TEXT,
            metadata TEXT,
            timestamp TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_processing_log_type
            ON processing_log(processing_type);
        CREATE INDEX IF NOT EXISTS idx_processing_log_timestamp
            ON processing_log(timestamp);
        ",
    )?;

    Ok(())
}
