//! Port for the append-only audit sink
//!
//! One record per communication attempt, one per capability-provider
//! invocation. Rows are write-once; the orchestrator never reads them back.

use async_trait::async_trait;
use domain::{CommunicationLogRecord, MultimodalProcessingLogRecord};

use crate::error::ApplicationError;

/// Port for append-only audit persistence
///
/// Supports unlimited concurrent writers; rows are independent and need no
/// transactional coordination.
#[async_trait]
pub trait AuditSinkPort: Send + Sync {
    /// Append one communication attempt record
    async fn record_communication(
        &self,
        record: &CommunicationLogRecord,
    ) -> Result<(), ApplicationError>;

    /// Append one multi-modal processing record
    async fn record_processing(
        &self,
        record: &MultimodalProcessingLogRecord,
    ) -> Result<(), ApplicationError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use domain::ProcessingType;
    use tokio::sync::Mutex;

    use super::*;

    /// Capturing sink used across the orchestrator test suite
    #[derive(Default)]
    struct MemorySink {
        communications: Arc<Mutex<Vec<CommunicationLogRecord>>>,
        processings: Arc<Mutex<Vec<MultimodalProcessingLogRecord>>>,
    }

    #[async_trait]
    impl AuditSinkPort for MemorySink {
        async fn record_communication(
            &self,
            record: &CommunicationLogRecord,
        ) -> Result<(), ApplicationError> {
            self.communications.lock().await.push(record.clone());
            Ok(())
        }

        async fn record_processing(
            &self,
            record: &MultimodalProcessingLogRecord,
        ) -> Result<(), ApplicationError> {
            self.processings.lock().await.push(record.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn sink_appends_communication_records() {
        let sink = MemorySink::default();
        let record = CommunicationLogRecord::sent("+264811234567", "hi", "SM1", 0.005);

        sink.record_communication(&record).await.unwrap();
        sink.record_communication(&record).await.unwrap();

        assert_eq!(sink.communications.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn sink_appends_processing_records() {
        let sink = MemorySink::default();
        let record = MultimodalProcessingLogRecord::failed(
            ProcessingType::SpeechToText,
            "https://cdn.example.com/voice.ogg",
            "unreachable",
        );

        sink.record_processing(&record).await.unwrap();

        let stored = sink.processings.lock().await;
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].success);
    }
}
