//! Error types for the Visa Direct client.
//!
//! # Design
//! One variant per failure stage: loading configuration and TLS material,
//! encoding the request, moving bytes over the network, a non-200 reply, and
//! decoding the reply. Nothing is retried or recovered locally; every variant
//! reaches the caller as-is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unreadable configuration, certificate, key or CA bundle.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// DNS, connect, TLS handshake, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}
