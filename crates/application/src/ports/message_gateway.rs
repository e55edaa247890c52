//! Port for the outbound messaging-gateway channel

use async_trait::async_trait;
use domain::{CommunicationResult, DeliveryStatus, OutboundMessage};

/// Port for sending messages through a messaging-gateway channel
///
/// Implementations own the credentials, build the wire payload, and map
/// gateway errors into failed [`CommunicationResult`]s. They never persist
/// state - audit logging belongs to the orchestrator.
#[async_trait]
pub trait MessageGatewayPort: Send + Sync {
    /// Send one message.
    ///
    /// Always returns a result, never panics or propagates transport
    /// errors: any network, authentication, or gateway-reported error is
    /// wrapped into a failed result.
    async fn send(&self, message: &OutboundMessage) -> CommunicationResult;

    /// Check that the gateway account is usable.
    ///
    /// Returns `true` only when the account status matches the provider's
    /// "active" sentinel. Any non-2xx response or transport error yields
    /// `false`.
    async fn verify_connection(&self) -> bool;

    /// Fetch the delivery status of a previously sent message.
    ///
    /// Any failure collapses to [`DeliveryStatus::Unknown`].
    async fn message_status(&self, message_id: &str) -> DeliveryStatus;

    /// Fixed channel identifier stamped on every result (e.g. "whatsapp")
    fn provider_name(&self) -> &str;
}
