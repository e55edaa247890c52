//! Communication orchestrator
//!
//! Top-level facade over the guest-communication flow. Every send
//! operation runs validate → gateway → one audit record → return; every
//! multi-modal operation runs provider → one processing record → result
//! or safe fallback. The audit write is best-effort: its failure is
//! reported through tracing and never changes the primary outcome.

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use domain::{
    AmenityDetection, CommunicationLogRecord, CommunicationResult, DeliveryStatus, ImageAnalysis,
    MultimodalProcessingLogRecord, OutboundMessage, PhoneNumber, ProcessingType,
    RoomConditionAssessment,
};
use tracing::{debug, instrument, warn};

use crate::{
    error::ApplicationError,
    fallback::{CapabilityFallback, fallback_for},
    ports::{AuditSinkPort, MessageGatewayPort, SpeechToTextPort, TextToSpeechPort, VisionPort},
    templates::TemplateRegistry,
};

/// Template name stamped on interactive sends
const INTERACTIVE_TEMPLATE: &str = "interactive";

/// Tunables for the orchestrator
#[derive(Debug, Clone)]
pub struct CommunicationServiceConfig {
    /// Upper bound on one audit write; a stalled sink cannot delay a send
    /// past this
    pub audit_write_timeout_ms: u64,
    /// Country code (digits only, e.g. "264") prepended to local numbers.
    /// When unset, recipients pass through to the gateway as given.
    pub default_country_code: Option<String>,
}

impl Default for CommunicationServiceConfig {
    fn default() -> Self {
        Self {
            audit_write_timeout_ms: 2_000,
            default_country_code: None,
        }
    }
}

/// Orchestrates template rendering, the gateway send, capability
/// providers, and the audit trail
pub struct CommunicationService {
    gateway: Arc<dyn MessageGatewayPort>,
    audit: Arc<dyn AuditSinkPort>,
    templates: TemplateRegistry,
    speech_to_text: Option<Arc<dyn SpeechToTextPort>>,
    text_to_speech: Option<Arc<dyn TextToSpeechPort>>,
    vision: Option<Arc<dyn VisionPort>>,
    config: CommunicationServiceConfig,
}

impl fmt::Debug for CommunicationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommunicationService")
            .field("config", &self.config)
            .field("templates", &self.templates.names())
            .finish_non_exhaustive()
    }
}

impl CommunicationService {
    /// Create an orchestrator over a gateway and an audit sink, with the
    /// built-in template set and no capability providers
    pub fn new(gateway: Arc<dyn MessageGatewayPort>, audit: Arc<dyn AuditSinkPort>) -> Self {
        Self {
            gateway,
            audit,
            templates: TemplateRegistry::with_builtins(),
            speech_to_text: None,
            text_to_speech: None,
            vision: None,
            config: CommunicationServiceConfig::default(),
        }
    }

    /// Replace the template registry
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Attach speech capability providers
    #[must_use]
    pub fn with_speech(
        mut self,
        speech_to_text: Arc<dyn SpeechToTextPort>,
        text_to_speech: Arc<dyn TextToSpeechPort>,
    ) -> Self {
        self.speech_to_text = Some(speech_to_text);
        self.text_to_speech = Some(text_to_speech);
        self
    }

    /// Attach an image-analysis capability provider
    #[must_use]
    pub fn with_vision(mut self, vision: Arc<dyn VisionPort>) -> Self {
        self.vision = Some(vision);
        self
    }

    /// Override the orchestrator tunables
    #[must_use]
    pub fn with_config(mut self, config: CommunicationServiceConfig) -> Self {
        self.config = config;
        self
    }

    // ------------------------------------------------------------------
    // Send operations
    // ------------------------------------------------------------------

    /// Send one message.
    ///
    /// Validates locally, delegates to the gateway, then writes exactly
    /// one communication log record - success or failure - before
    /// returning. Never returns an error: failures come back as a failed
    /// [`CommunicationResult`].
    #[instrument(skip(self, message), fields(recipient = %message.recipient))]
    pub async fn send_message(&self, message: &OutboundMessage) -> CommunicationResult {
        let prepared = validate(message).and_then(|()| self.prepare_recipient(message));

        let (message, result) = match prepared {
            Ok(prepared) => {
                let result = self.gateway.send(&prepared).await;
                (prepared, result)
            },
            Err(reason) => {
                debug!(%reason, "Message rejected before gateway call");
                let result = CommunicationResult::failed(
                    self.gateway.provider_name(),
                    ApplicationError::Validation(reason).to_string(),
                );
                (message.clone(), result)
            },
        };

        self.log_send_attempt(&message, &result).await;
        result
    }

    /// Normalize the recipient into E.164 when a country code is configured
    fn prepare_recipient(&self, message: &OutboundMessage) -> Result<OutboundMessage, String> {
        let Some(country_code) = &self.config.default_country_code else {
            return Ok(message.clone());
        };

        let phone = PhoneNumber::normalize(&message.recipient, country_code)
            .map_err(|e| e.to_string())?;
        Ok(OutboundMessage {
            recipient: phone.as_str().to_string(),
            ..message.clone()
        })
    }

    /// Render a named template and send the result.
    ///
    /// An unknown template comes back as a failed result (still logged),
    /// never as an error.
    #[instrument(skip(self, variables), fields(template = %template_name, recipient = %recipient))]
    pub async fn send_template_message(
        &self,
        template_name: &str,
        recipient: &str,
        variables: &HashMap<String, String>,
    ) -> CommunicationResult {
        match self.templates.render(template_name, variables) {
            Ok(body) => {
                let message = OutboundMessage::text(recipient, body).with_template(template_name);
                self.send_message(&message).await
            },
            Err(err) => {
                debug!(error = %err, "Template resolution failed");
                let result =
                    CommunicationResult::failed(self.gateway.provider_name(), err.to_string());
                let record = CommunicationLogRecord::failed(
                    recipient,
                    "",
                    result.error.as_deref().unwrap_or_default(),
                )
                .with_template(template_name);
                self.write_communication(record).await;
                result
            },
        }
    }

    /// Send a message with tappable options rendered as a numbered list.
    ///
    /// The channel offers no native interactive affordances, so buttons
    /// become numbered lines with a "reply with the number" instruction.
    /// With no buttons this is exactly [`Self::send_message`].
    #[instrument(skip(self, message), fields(recipient = %message.recipient, buttons = message.buttons.len()))]
    pub async fn send_interactive_message(&self, message: &OutboundMessage) -> CommunicationResult {
        if message.buttons.is_empty() {
            return self.send_message(message).await;
        }

        let mut content = message.content.clone();
        content.push('\n');
        for (index, button) in message.buttons.iter().enumerate() {
            content.push_str(&format!("\n{}. {}: {}", index + 1, button.text, button.value));
        }
        content.push_str("\n\nPlease reply with the number of your choice.");

        let expanded = OutboundMessage {
            content,
            template_name: Some(INTERACTIVE_TEMPLATE.to_string()),
            buttons: Vec::new(),
            ..message.clone()
        };
        self.send_message(&expanded).await
    }

    /// Check that the gateway account is usable (read-only, not logged)
    pub async fn verify_connection(&self) -> bool {
        self.gateway.verify_connection().await
    }

    /// Fetch the delivery status of a sent message (read-only, not logged)
    pub async fn message_status(&self, message_id: &str) -> DeliveryStatus {
        self.gateway.message_status(message_id).await
    }

    // ------------------------------------------------------------------
    // Multi-modal operations
    // ------------------------------------------------------------------

    /// Transcribe a guest voice message.
    ///
    /// On provider failure the guest gets a plain-language retry request,
    /// never an error; the failure itself lands in the processing log.
    #[instrument(skip(self))]
    pub async fn process_voice_message(&self, audio_url: &str) -> String {
        let outcome = match &self.speech_to_text {
            Some(stt) => stt.transcribe(audio_url).await,
            None => Err(not_configured("speech-to-text")),
        };

        match outcome {
            Ok(text) => {
                self.write_processing(MultimodalProcessingLogRecord::succeeded(
                    ProcessingType::SpeechToText,
                    audio_url,
                    &text,
                ))
                .await;
                text
            },
            Err(err) => {
                warn!(error = %err, "Voice transcription failed, returning fallback");
                self.write_processing(MultimodalProcessingLogRecord::failed(
                    ProcessingType::SpeechToText,
                    audio_url,
                    err.to_string(),
                ))
                .await;
                fallback_for(ProcessingType::SpeechToText)
                    .and_then(CapabilityFallback::into_transcript)
                    .unwrap_or_default()
            },
        }
    }

    /// Synthesize a voice reply.
    ///
    /// The one multi-modal operation without a fallback: no audio buffer
    /// is a meaningful stand-in, so failures propagate after being logged.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn generate_voice_response(&self, text: &str) -> Result<Vec<u8>, ApplicationError> {
        let outcome = match &self.text_to_speech {
            Some(tts) => tts.synthesize(text).await,
            None => Err(not_configured("text-to-speech")),
        };

        match outcome {
            Ok(audio) => {
                let output_ref = format!("{} byte audio buffer", audio.len());
                self.write_processing(MultimodalProcessingLogRecord::succeeded(
                    ProcessingType::TextToSpeech,
                    text,
                    &output_ref,
                ))
                .await;
                Ok(audio)
            },
            Err(err) => {
                warn!(error = %err, "Voice synthesis failed");
                self.write_processing(MultimodalProcessingLogRecord::failed(
                    ProcessingType::TextToSpeech,
                    text,
                    err.to_string(),
                ))
                .await;
                Err(err)
            },
        }
    }

    /// Analyze a guest-submitted image.
    ///
    /// Falls back to a neutral acknowledgement on provider failure.
    #[instrument(skip(self))]
    pub async fn analyze_image_message(
        &self,
        image_url: &str,
        content_hint: Option<&str>,
    ) -> ImageAnalysis {
        let outcome = match &self.vision {
            Some(vision) => vision.analyze_image(image_url, content_hint).await,
            None => Err(not_configured("image-analysis")),
        };

        match outcome {
            Ok(analysis) => {
                let record = MultimodalProcessingLogRecord::succeeded(
                    ProcessingType::ImageAnalysis,
                    image_url,
                    &analysis.description,
                )
                .with_metadata(&serde_json::json!({
                    "sentiment": analysis.sentiment,
                    "objects": analysis.objects,
                    "insights": analysis.insights,
                    "confidence": analysis.confidence,
                }));
                self.write_processing(record).await;
                analysis
            },
            Err(err) => {
                warn!(error = %err, "Image analysis failed, returning fallback");
                self.write_processing(MultimodalProcessingLogRecord::failed(
                    ProcessingType::ImageAnalysis,
                    image_url,
                    err.to_string(),
                ))
                .await;
                fallback_for(ProcessingType::ImageAnalysis)
                    .and_then(CapabilityFallback::into_analysis)
                    .unwrap_or_default()
            },
        }
    }

    /// Assess the housekeeping condition of a room photo.
    ///
    /// Falls back to a mid-scale unknown assessment on provider failure.
    #[instrument(skip(self))]
    pub async fn check_room_condition(&self, image_url: &str) -> RoomConditionAssessment {
        let outcome = match &self.vision {
            Some(vision) => vision.assess_room_condition(image_url).await,
            None => Err(not_configured("image-analysis")),
        };

        match outcome {
            Ok(assessment) => {
                let record = MultimodalProcessingLogRecord::succeeded(
                    ProcessingType::RoomConditionAnalysis,
                    image_url,
                    assessment.condition.as_str(),
                )
                .with_metadata(&serde_json::json!({
                    "cleanliness": assessment.cleanliness,
                    "condition": assessment.condition,
                    "issues": assessment.issues,
                    "recommendations": assessment.recommendations,
                }));
                self.write_processing(record).await;
                assessment
            },
            Err(err) => {
                warn!(error = %err, "Room condition assessment failed, returning fallback");
                self.write_processing(MultimodalProcessingLogRecord::failed(
                    ProcessingType::RoomConditionAnalysis,
                    image_url,
                    err.to_string(),
                ))
                .await;
                fallback_for(ProcessingType::RoomConditionAnalysis)
                    .and_then(CapabilityFallback::into_condition)
                    .unwrap_or_default()
            },
        }
    }

    /// Inventory the amenities visible in a room photo.
    ///
    /// Falls back to an empty inventory on provider failure.
    #[instrument(skip(self))]
    pub async fn detect_room_amenities(&self, image_url: &str) -> AmenityDetection {
        let outcome = match &self.vision {
            Some(vision) => vision.detect_amenities(image_url).await,
            None => Err(not_configured("image-analysis")),
        };

        match outcome {
            Ok(detection) => {
                let names: Vec<&str> =
                    detection.amenities.iter().map(|a| a.name.as_str()).collect();
                let record = MultimodalProcessingLogRecord::succeeded(
                    ProcessingType::AmenityDetection,
                    image_url,
                    &detection.room_type,
                )
                .with_metadata(&serde_json::json!({
                    "room_type": detection.room_type,
                    "quality": detection.quality,
                    "amenities": names,
                }));
                self.write_processing(record).await;
                detection
            },
            Err(err) => {
                warn!(error = %err, "Amenity detection failed, returning fallback");
                self.write_processing(MultimodalProcessingLogRecord::failed(
                    ProcessingType::AmenityDetection,
                    image_url,
                    err.to_string(),
                ))
                .await;
                fallback_for(ProcessingType::AmenityDetection)
                    .and_then(CapabilityFallback::into_amenities)
                    .unwrap_or_default()
            },
        }
    }

    // ------------------------------------------------------------------
    // Audit writes
    // ------------------------------------------------------------------

    async fn log_send_attempt(&self, message: &OutboundMessage, result: &CommunicationResult) {
        let mut record = if result.success {
            CommunicationLogRecord::sent(
                &message.recipient,
                &message.content,
                result.message_id.as_deref().unwrap_or_default(),
                result.cost.unwrap_or(0.0),
            )
        } else {
            CommunicationLogRecord::failed(
                &message.recipient,
                &message.content,
                result.error.as_deref().unwrap_or("unknown error"),
            )
        };

        record = record.with_media(message.has_media());
        if let Some(name) = &message.template_name {
            record = record.with_template(name);
        }
        self.write_communication(record).await;
    }

    /// Best-effort, bounded audit write: the gateway outcome is already
    /// final by the time this runs, and nothing here can change it.
    ///
    /// The write runs on its own task and is awaited up to the configured
    /// timeout. A sink slower than that stops delaying the caller, but the
    /// detached write still runs to completion.
    async fn write_communication(&self, record: CommunicationLogRecord) {
        let audit = Arc::clone(&self.audit);
        let record_id = record.id;
        let handle = tokio::spawn(async move { audit.record_communication(&record).await });

        let timeout = Duration::from_millis(self.config.audit_write_timeout_ms);
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Ok(()))) => {},
            Ok(Ok(Err(err))) => {
                warn!(error = %err, record_id = %record_id, "Communication audit write failed");
            },
            Ok(Err(err)) => {
                warn!(error = %err, record_id = %record_id, "Communication audit write task failed");
            },
            Err(_) => {
                warn!(record_id = %record_id, "Communication audit write still running at timeout");
            },
        }
    }

    async fn write_processing(&self, record: MultimodalProcessingLogRecord) {
        let audit = Arc::clone(&self.audit);
        let record_id = record.id;
        let handle = tokio::spawn(async move { audit.record_processing(&record).await });

        let timeout = Duration::from_millis(self.config.audit_write_timeout_ms);
        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(Ok(()))) => {},
            Ok(Ok(Err(err))) => {
                warn!(error = %err, record_id = %record_id, "Processing audit write failed");
            },
            Ok(Err(err)) => {
                warn!(error = %err, record_id = %record_id, "Processing audit write task failed");
            },
            Err(_) => {
                warn!(record_id = %record_id, "Processing audit write still running at timeout");
            },
        }
    }
}

/// Local precondition check; failures never reach the gateway
fn validate(message: &OutboundMessage) -> Result<(), String> {
    if message.recipient.trim().is_empty() {
        return Err("recipient is required".to_string());
    }
    if message.content.trim().is_empty() {
        return Err("content is required".to_string());
    }
    Ok(())
}

fn not_configured(capability: &str) -> ApplicationError {
    ApplicationError::Provider(format!("{capability} provider not configured"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use domain::{CommunicationStatus, MessageButton};
    use tokio::sync::Mutex;

    use super::*;

    struct StubGateway {
        calls: AtomicUsize,
        result: CommunicationResult,
    }

    impl StubGateway {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: CommunicationResult::sent("whatsapp", "SM123", 0.005),
            }
        }

        fn failing(error: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: CommunicationResult::failed("whatsapp", error),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessageGatewayPort for StubGateway {
        async fn send(&self, _message: &OutboundMessage) -> CommunicationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        async fn verify_connection(&self) -> bool {
            true
        }

        async fn message_status(&self, _message_id: &str) -> DeliveryStatus {
            DeliveryStatus::Delivered
        }

        fn provider_name(&self) -> &str {
            "whatsapp"
        }
    }

    #[derive(Default)]
    struct MemorySink {
        communications: Mutex<Vec<CommunicationLogRecord>>,
        processings: Mutex<Vec<MultimodalProcessingLogRecord>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl AuditSinkPort for MemorySink {
        async fn record_communication(
            &self,
            record: &CommunicationLogRecord,
        ) -> Result<(), ApplicationError> {
            if self.fail_writes {
                return Err(ApplicationError::Logging("sink unavailable".to_string()));
            }
            self.communications.lock().await.push(record.clone());
            Ok(())
        }

        async fn record_processing(
            &self,
            record: &MultimodalProcessingLogRecord,
        ) -> Result<(), ApplicationError> {
            if self.fail_writes {
                return Err(ApplicationError::Logging("sink unavailable".to_string()));
            }
            self.processings.lock().await.push(record.clone());
            Ok(())
        }
    }

    fn service(
        gateway: Arc<StubGateway>,
        sink: Arc<MemorySink>,
    ) -> CommunicationService {
        CommunicationService::new(gateway, sink)
    }

    #[tokio::test]
    async fn successful_send_logs_one_sent_record() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let message = OutboundMessage::text("+264811234567", "Hello");
        let result = svc.send_message(&message).await;

        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("SM123"));
        assert_eq!(gateway.call_count(), 1);

        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, CommunicationStatus::Sent);
        assert_eq!(records[0].external_message_id.as_deref(), Some("SM123"));
    }

    #[tokio::test]
    async fn empty_recipient_skips_gateway_but_still_logs() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let message = OutboundMessage::text("", "Hello");
        let result = svc.send_message(&message).await;

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or_default().contains("recipient"));
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(sink.communications.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_content_skips_gateway_but_still_logs() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let result = svc.send_message(&OutboundMessage::text("+264811234567", "  ")).await;

        assert!(!result.success);
        assert_eq!(gateway.call_count(), 0);

        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, CommunicationStatus::Failed);
    }

    #[tokio::test]
    async fn gateway_failure_logs_failed_record() {
        let gateway = Arc::new(StubGateway::failing("gateway timeout"));
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let result = svc.send_message(&OutboundMessage::text("+264811234567", "hi")).await;

        assert!(!result.success);
        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, CommunicationStatus::Failed);
        assert_eq!(records[0].error.as_deref(), Some("gateway timeout"));
    }

    #[tokio::test]
    async fn sink_failure_never_changes_the_result() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink {
            fail_writes: true,
            ..Default::default()
        });
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let result = svc.send_message(&OutboundMessage::text("+264811234567", "hi")).await;

        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("SM123"));
    }

    struct StalledSink;

    #[async_trait]
    impl AuditSinkPort for StalledSink {
        async fn record_communication(
            &self,
            _record: &CommunicationLogRecord,
        ) -> Result<(), ApplicationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn record_processing(
            &self,
            _record: &MultimodalProcessingLogRecord,
        ) -> Result<(), ApplicationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn stalled_sink_is_cut_off_by_the_write_timeout() {
        let gateway = Arc::new(StubGateway::succeeding());
        let svc = CommunicationService::new(Arc::clone(&gateway) as Arc<dyn MessageGatewayPort>, Arc::new(StalledSink))
            .with_config(CommunicationServiceConfig {
                audit_write_timeout_ms: 20,
                ..Default::default()
            });

        let result = svc.send_message(&OutboundMessage::text("+264811234567", "hi")).await;

        assert!(result.success);
        assert_eq!(gateway.call_count(), 1);
    }

    /// Sink slower than the write timeout but faster than the test
    struct SlowSink {
        delay: Duration,
        completions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AuditSinkPort for SlowSink {
        async fn record_communication(
            &self,
            _record: &CommunicationLogRecord,
        ) -> Result<(), ApplicationError> {
            tokio::time::sleep(self.delay).await;
            self.completions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn record_processing(
            &self,
            _record: &MultimodalProcessingLogRecord,
        ) -> Result<(), ApplicationError> {
            tokio::time::sleep(self.delay).await;
            self.completions.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_audit_write_still_completes_after_the_cutoff() {
        let gateway = Arc::new(StubGateway::succeeding());
        let completions = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(SlowSink {
            delay: Duration::from_millis(100),
            completions: Arc::clone(&completions),
        });
        let svc = CommunicationService::new(
            Arc::clone(&gateway) as Arc<dyn MessageGatewayPort>,
            sink,
        )
        .with_config(CommunicationServiceConfig {
            audit_write_timeout_ms: 10,
            ..Default::default()
        });

        let result = svc.send_message(&OutboundMessage::text("+264811234567", "hi")).await;

        // The caller is released at the timeout, before the write lands
        assert!(result.success);
        assert_eq!(completions.load(Ordering::SeqCst), 0);

        // The detached write still runs to completion
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn local_recipient_is_normalized_before_logging() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink)).with_config(
            CommunicationServiceConfig {
                default_country_code: Some("264".to_string()),
                ..Default::default()
            },
        );

        let result = svc.send_message(&OutboundMessage::text("081 123 4567", "hi")).await;

        assert!(result.success);
        assert_eq!(gateway.call_count(), 1);

        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].recipient, "+264811234567");
    }

    #[tokio::test]
    async fn unnormalizable_recipient_skips_gateway_but_still_logs() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink)).with_config(
            CommunicationServiceConfig {
                default_country_code: Some("264".to_string()),
                ..Default::default()
            },
        );

        let result = svc.send_message(&OutboundMessage::text("not a number", "hi")).await;

        assert!(!result.success);
        assert_eq!(gateway.call_count(), 0);

        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, CommunicationStatus::Failed);
    }

    #[tokio::test]
    async fn template_send_renders_and_tags_record() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let mut vars = HashMap::new();
        vars.insert("guest.name".to_string(), "Amara".to_string());
        vars.insert("property.name".to_string(), "Etuna".to_string());

        let result = svc
            .send_template_message("booking_welcome", "+264811234567", &vars)
            .await;

        assert!(result.success);
        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].template_name.as_deref(), Some("booking_welcome"));
        assert!(records[0].content_preview.contains("Amara"));
        assert!(records[0].content_preview.contains("Etuna"));
    }

    #[tokio::test]
    async fn unknown_template_fails_without_gateway_call_but_logs() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let result = svc
            .send_template_message("no_such", "+264811234567", &HashMap::new())
            .await;

        assert!(!result.success);
        assert!(result.error.as_deref().unwrap_or_default().contains("no_such"));
        assert_eq!(gateway.call_count(), 0);

        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].template_name.as_deref(), Some("no_such"));
    }

    #[tokio::test]
    async fn interactive_without_buttons_matches_plain_send() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let message = OutboundMessage::text("+264811234567", "Choose wisely");
        svc.send_interactive_message(&message).await;
        svc.send_message(&message).await;

        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content_preview, records[1].content_preview);
        assert_eq!(records[0].template_name, records[1].template_name);
    }

    #[tokio::test]
    async fn interactive_with_buttons_appends_numbered_list() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(Arc::clone(&gateway), Arc::clone(&sink));

        let message = OutboundMessage::text("+264811234567", "How can we help?").with_buttons(vec![
            MessageButton::call("Call reception", "+264811111111"),
            MessageButton::url("View menu", "https://example.com/menu"),
        ]);
        let result = svc.send_interactive_message(&message).await;

        assert!(result.success);
        let records = sink.communications.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].template_name.as_deref(), Some("interactive"));
        assert!(records[0].content_preview.contains("1. Call reception: +264811111111"));
        assert!(records[0].content_preview.contains("2. View menu: https://example.com/menu"));
        assert!(records[0].content_preview.contains("reply with the number"));
    }

    #[tokio::test]
    async fn voice_without_provider_returns_fallback_and_logs_failure() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(gateway, Arc::clone(&sink));

        let text = svc.process_voice_message("https://cdn.example.com/v.ogg").await;

        assert!(text.contains("text message"));
        let records = sink.processings.lock().await;
        assert_eq!(records.len(), 1);
        assert!(!records[0].success);
        assert_eq!(records[0].processing_type, ProcessingType::SpeechToText);
    }

    #[tokio::test]
    async fn synthesis_without_provider_propagates_error_after_logging() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(gateway, Arc::clone(&sink));

        let result = svc.generate_voice_response("Welcome!").await;

        assert!(matches!(result, Err(ApplicationError::Provider(_))));
        let records = sink.processings.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].processing_type, ProcessingType::TextToSpeech);
    }

    #[tokio::test]
    async fn room_condition_without_provider_returns_safe_fallback() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(gateway, Arc::clone(&sink));

        let assessment = svc.check_room_condition("https://cdn.example.com/room.jpg").await;

        assert_eq!(assessment.cleanliness, 5);
        assert_eq!(assessment.condition, domain::RoomCondition::Unknown);
        assert!(!assessment.recommendations.is_empty());
        assert_eq!(sink.processings.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn amenity_detection_without_provider_returns_empty_inventory() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(gateway, Arc::clone(&sink));

        let detection = svc.detect_room_amenities("https://cdn.example.com/room.jpg").await;

        assert!(detection.amenities.is_empty());
        assert_eq!(detection.room_type, "unknown");
        assert_eq!(sink.processings.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn image_analysis_without_provider_returns_neutral_fallback() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(gateway, Arc::clone(&sink));

        let analysis = svc
            .analyze_image_message("https://cdn.example.com/p.jpg", Some("a leaking tap"))
            .await;

        assert_eq!(analysis.sentiment, domain::Sentiment::Neutral);
        assert!(!analysis.insights.is_empty());
        assert_eq!(sink.processings.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn read_only_diagnostics_are_not_logged() {
        let gateway = Arc::new(StubGateway::succeeding());
        let sink = Arc::new(MemorySink::default());
        let svc = service(gateway, Arc::clone(&sink));

        assert!(svc.verify_connection().await);
        assert_eq!(svc.message_status("SM123").await, DeliveryStatus::Delivered);

        assert!(sink.communications.lock().await.is_empty());
        assert!(sink.processings.lock().await.is_empty());
    }
}
