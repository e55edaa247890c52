//! Integration tests for the gateway client using WireMock
//!
//! These tests mock the gateway REST API to verify client behavior
//! without making actual API calls.

use application::{CostModel, MessageGatewayPort};
use domain::{DeliveryStatus, OutboundMessage};
use integration_gateway::{GatewayClient, GatewayClientConfig};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn test_config(base_url: &str) -> GatewayClientConfig {
    GatewayClientConfig {
        api_key: "test_key".to_string(),
        sender: "+264810000000".to_string(),
        base_url: base_url.to_string(),
        timeout_secs: 5,
    }
}

fn client_for(server: &MockServer) -> GatewayClient {
    GatewayClient::new(test_config(&server.uri())).expect("Failed to create client")
}

mod send_tests {
    use super::*;

    #[tokio::test]
    async fn successful_send_returns_message_id_and_cost() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("authorization", "Bearer test_key"))
            .and(body_partial_json(serde_json::json!({
                "to": "+264811234567",
                "from": "+264810000000",
                "body": "Hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message_id": "SM123",
                "segments": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.send(&OutboundMessage::text("+264811234567", "Hello")).await;

        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("SM123"));
        assert_eq!(result.provider, "whatsapp");
        let cost = result.cost.unwrap_or_default();
        assert!((cost - 0.005).abs() < 1e-12);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn media_message_includes_url_and_surcharge() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(serde_json::json!({
                "media_url": "https://cdn.example.com/pool.jpg"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message_id": "SM124",
                "segments": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let message = OutboundMessage::text("+264811234567", "See our pool")
            .with_media("https://cdn.example.com/pool.jpg");
        let result = client.send(&message).await;

        assert!(result.success);
        let cost = result.cost.unwrap_or_default();
        assert!((cost - 0.015).abs() < 1e-12);
    }

    #[tokio::test]
    async fn multi_segment_cost_uses_gateway_segment_count() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message_id": "SM125",
                "segments": 3
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::with_cost_model(
            test_config(&server.uri()),
            CostModel::new(0.005, 0.01),
        )
        .expect("Failed to create client");
        let result = client.send(&OutboundMessage::text("+264811234567", "long text")).await;

        let cost = result.cost.unwrap_or_default();
        assert!((cost - 0.015).abs() < 1e-12);
    }

    #[tokio::test]
    async fn missing_segment_count_falls_back_to_local_arithmetic() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message_id": "SM126"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        // 200 chars -> 2 segments at 160 chars each
        let result = client
            .send(&OutboundMessage::text("+264811234567", "x".repeat(200)))
            .await;

        assert!(result.success);
        let cost = result.cost.unwrap_or_default();
        assert!((cost - 0.010).abs() < 1e-12);
    }

    #[tokio::test]
    async fn empty_recipient_fails_without_a_network_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message_id": "SM999",
                "segments": 1
            })))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.send(&OutboundMessage::text("", "Hello")).await;

        assert!(!result.success);
        assert!(result.message_id.is_none());
        assert!(result.error.unwrap_or_default().contains("recipient"));
    }

    #[tokio::test]
    async fn empty_content_fails_without_a_network_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.send(&OutboundMessage::text("+264811234567", "   ")).await;

        assert!(!result.success);
        assert!(result.error.unwrap_or_default().contains("content"));
    }

    #[tokio::test]
    async fn api_error_becomes_failed_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "code": 429, "message": "rate limited" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.send(&OutboundMessage::text("+264811234567", "hi")).await;

        assert!(!result.success);
        assert!(result.message_id.is_none());
        assert!(result.cost.is_none());
        let error = result.error.unwrap_or_default();
        assert!(error.contains("429"));
        assert!(error.contains("rate limited"));
    }

    #[tokio::test]
    async fn connection_refused_becomes_failed_result() {
        // Nothing listening on this port
        let config = test_config("http://127.0.0.1:9");
        let client = GatewayClient::new(config).expect("Failed to create client");

        let result = client.send(&OutboundMessage::text("+264811234567", "hi")).await;

        assert!(!result.success);
        assert_eq!(result.provider, "whatsapp");
        assert!(result.error.is_some());
    }
}

mod account_tests {
    use super::*;

    #[tokio::test]
    async fn active_account_verifies() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .and(header("authorization", "Bearer test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "active"
            })))
            .mount(&server)
            .await;

        assert!(client_for(&server).verify_connection().await);
    }

    #[tokio::test]
    async fn suspended_account_does_not_verify() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "suspended"
            })))
            .mount(&server)
            .await;

        assert!(!client_for(&server).verify_connection().await);
    }

    #[tokio::test]
    async fn auth_rejection_does_not_verify() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/account"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(!client_for(&server).verify_connection().await);
    }

    #[tokio::test]
    async fn unreachable_gateway_does_not_verify() {
        let client =
            GatewayClient::new(test_config("http://127.0.0.1:9")).expect("Failed to create client");
        assert!(!client.verify_connection().await);
    }
}

mod status_tests {
    use super::*;

    #[tokio::test]
    async fn known_status_is_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/messages/SM123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "delivered"
            })))
            .mount(&server)
            .await;

        let status = client_for(&server).message_status("SM123").await;
        assert_eq!(status, DeliveryStatus::Delivered);
    }

    #[tokio::test]
    async fn unrecognized_status_collapses_to_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/messages/SM123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "transmogrified"
            })))
            .mount(&server)
            .await;

        let status = client_for(&server).message_status("SM123").await;
        assert_eq!(status, DeliveryStatus::Unknown);
    }

    #[tokio::test]
    async fn lookup_error_collapses_to_unknown() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/messages/SM404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let status = client_for(&server).message_status("SM404").await;
        assert_eq!(status, DeliveryStatus::Unknown);
    }
}
