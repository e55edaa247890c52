//! Messaging gateway integration
//!
//! HTTP client for the hosted WhatsApp-style messaging gateway, exposing
//! it to the application layer through [`application::MessageGatewayPort`].

pub mod client;

pub use client::{GatewayClient, GatewayClientConfig, GatewayError};
