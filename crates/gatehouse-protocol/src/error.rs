//! Error types for the protocol layer.
//!
//! Each crate in Gatehouse defines its own error enum. A `ProtocolError`
//! always means the bytes exchanged with the auth API could not be turned
//! into (or produced from) the expected shape.

/// Errors that can occur while encoding or decoding API payloads.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// wrong data types, or a truncated response body.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload parsed but violates a protocol rule, e.g. an
    /// `AuthResponse` carrying an empty token.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
