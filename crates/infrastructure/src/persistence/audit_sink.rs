//! SQLite audit sink
//!
//! Implements [`AuditSinkPort`] over the pooled connection. Rows are
//! inserted once and never updated; the orchestrator treats failures here
//! as non-fatal, so errors only need to carry enough detail for the log.

use std::sync::Arc;

use application::{ApplicationError, AuditSinkPort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    CommunicationLogRecord, CommunicationStatus, MultimodalProcessingLogRecord, ProcessingType,
};
use rusqlite::{Row, params};
use tokio::task;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::connection::ConnectionPool;

/// SQLite-backed audit sink
#[derive(Debug, Clone)]
pub struct SqliteAuditSink {
    pool: Arc<ConnectionPool>,
}

impl SqliteAuditSink {
    /// Create a new SQLite audit sink
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Most recent communication records, newest first
    pub async fn recent_communications(
        &self,
        limit: u32,
    ) -> Result<Vec<CommunicationLogRecord>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| ApplicationError::Logging(e.to_string()))?;

            let mut stmt = conn
                .prepare(
                    "SELECT id, recipient, content_preview, status, error, \
                     external_message_id, cost, has_media, template_name, timestamp
                     FROM communication_log
                     ORDER BY timestamp DESC
                     LIMIT ?1",
                )
                .map_err(|e| ApplicationError::Logging(e.to_string()))?;

            let rows = stmt
                .query_map([limit], row_to_communication)
                .map_err(|e| ApplicationError::Logging(e.to_string()))?
                .filter_map(Result::ok)
                .collect();

            Ok(rows)
        })
        .await
        .map_err(|e| ApplicationError::Logging(e.to_string()))?
    }

    /// Most recent processing records, newest first
    pub async fn recent_processings(
        &self,
        limit: u32,
    ) -> Result<Vec<MultimodalProcessingLogRecord>, ApplicationError> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| ApplicationError::Logging(e.to_string()))?;

            let mut stmt = conn
                .prepare(
                    "SELECT id, processing_type, input_ref, output_ref, success, \
                     error, metadata, timestamp
                     FROM processing_log
                     ORDER BY timestamp DESC
                     LIMIT ?1",
                )
                .map_err(|e| ApplicationError::Logging(e.to_string()))?;

            let rows = stmt
                .query_map([limit], row_to_processing)
                .map_err(|e| ApplicationError::Logging(e.to_string()))?
                .filter_map(Result::ok)
                .collect();

            Ok(rows)
        })
        .await
        .map_err(|e| ApplicationError::Logging(e.to_string()))?
    }
}

#[async_trait]
impl AuditSinkPort for SqliteAuditSink {
    #[instrument(skip(self, record), fields(record_id = %record.id, status = %record.status))]
    async fn record_communication(
        &self,
        record: &CommunicationLogRecord,
    ) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let record = record.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| ApplicationError::Logging(e.to_string()))?;

            conn.execute(
                "INSERT INTO communication_log (id, recipient, content_preview, status, \
                 error, external_message_id, cost, has_media, template_name, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.id.to_string(),
                    record.recipient,
                    record.content_preview,
                    record.status.as_str(),
                    record.error,
                    record.external_message_id,
                    record.cost,
                    i32::from(record.has_media),
                    record.template_name,
                    record.timestamp.to_rfc3339(),
                ],
            )
            .map_err(|e| ApplicationError::Logging(e.to_string()))?;

            debug!("Recorded communication attempt");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Logging(e.to_string()))?
    }

    #[instrument(skip(self, record), fields(record_id = %record.id, processing_type = %record.processing_type))]
    async fn record_processing(
        &self,
        record: &MultimodalProcessingLogRecord,
    ) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let record = record.clone();

        task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| ApplicationError::Logging(e.to_string()))?;

            conn.execute(
                "INSERT INTO processing_log (id, processing_type, input_ref, output_ref, \
                 success, error, metadata, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id.to_string(),
                    record.processing_type.as_str(),
                    record.input_ref,
                    record.output_ref,
                    i32::from(record.success),
                    record.error,
                    record.metadata.as_ref().map(serde_json::Value::to_string),
                    record.timestamp.to_rfc3339(),
                ],
            )
            .map_err(|e| ApplicationError::Logging(e.to_string()))?;

            debug!("Recorded processing attempt");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Logging(e.to_string()))?
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

fn parse_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::nil())
}

fn row_to_communication(row: &Row<'_>) -> rusqlite::Result<CommunicationLogRecord> {
    let id: String = row.get(0)?;
    let status: String = row.get(3)?;
    let has_media: i32 = row.get(7)?;
    let timestamp: String = row.get(9)?;

    Ok(CommunicationLogRecord {
        id: parse_id(&id),
        recipient: row.get(1)?,
        content_preview: row.get(2)?,
        status: if status == "sent" {
            CommunicationStatus::Sent
        } else {
            CommunicationStatus::Failed
        },
        error: row.get(4)?,
        external_message_id: row.get(5)?,
        cost: row.get(6)?,
        has_media: has_media != 0,
        template_name: row.get(8)?,
        timestamp: parse_timestamp(&timestamp),
    })
}

fn row_to_processing(row: &Row<'_>) -> rusqlite::Result<MultimodalProcessingLogRecord> {
    let id: String = row.get(0)?;
    let processing_type: String = row.get(1)?;
    let success: i32 = row.get(4)?;
    let metadata: Option<String> = row.get(6)?;
    let timestamp: String = row.get(7)?;

    Ok(MultimodalProcessingLogRecord {
        id: parse_id(&id),
        processing_type: parse_processing_type(&processing_type),
        input_ref: row.get(2)?,
        output_ref: row.get(3)?,
        success: success != 0,
        error: row.get(5)?,
        metadata: metadata.and_then(|raw| serde_json::from_str(&raw).ok()),
        timestamp: parse_timestamp(&timestamp),
    })
}

fn parse_processing_type(raw: &str) -> ProcessingType {
    match raw {
        "text_to_speech" => ProcessingType::TextToSpeech,
        "image_analysis" => ProcessingType::ImageAnalysis,
        "room_condition_analysis" => ProcessingType::RoomConditionAnalysis,
        "amenity_detection" => ProcessingType::AmenityDetection,
        _ => ProcessingType::SpeechToText,
    }
}
