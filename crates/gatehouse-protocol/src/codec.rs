//! Codec trait and the JSON implementation used for auth API payloads.
//!
//! The session layer never touches raw bytes itself: an `AuthApi`
//! implementation receives a response body and hands it to a [`Codec`].
//! Anything that fails to decode is reported as a [`ProtocolError`], which
//! the session store treats like every other fetch failure.

use serde::{Serialize, de::DeserializeOwned};

use crate::{AuthResponse, ProtocolError};

/// Encodes Rust values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so a codec can live inside an `AuthApi` that is
/// shared with spawned tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes a login/register response and checks that it carries a
    /// usable token.
    ///
    /// # Errors
    /// `ProtocolError::Decode` for malformed bodies,
    /// `ProtocolError::InvalidPayload` for an empty token.
    fn decode_auth_response(&self, data: &[u8]) -> Result<AuthResponse, ProtocolError> {
        let response: AuthResponse = self.decode(data)?;
        response.validate()?;
        Ok(response)
    }
}

/// A [`Codec`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoginRequest, User};

    #[test]
    fn test_decode_user_from_server_body() {
        let body = br#"{"id":"7","username":"alice","email":"alice@example.com"}"#;

        let user: User = JsonCodec.decode(body).expect("valid body");

        assert_eq!(user.id.as_str(), "7");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn test_decode_truncated_body_returns_decode_error() {
        let result: Result<User, _> = JsonCodec.decode(br#"{"id":"7","user"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_returns_decode_error() {
        let result: Result<User, _> = JsonCodec.decode(b"[1,2,3]");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_login_request_has_expected_fields() {
        let req = LoginRequest {
            email: "a@b.co".into(),
            password: "password1".into(),
        };

        let bytes = JsonCodec.encode(&req).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["email"], "a@b.co");
        assert_eq!(value["password"], "password1");
    }

    #[test]
    fn test_decode_auth_response_accepts_token_and_user() {
        let body = br#"{"token":"tok123","user":{"id":"1","username":"bob"}}"#;

        let response = JsonCodec.decode_auth_response(body).unwrap();

        assert_eq!(response.token, "tok123");
        assert_eq!(response.user.username, "bob");
    }

    #[test]
    fn test_decode_auth_response_rejects_blank_token() {
        let body = br#"{"token":"  ","user":{"id":"1","username":"bob"}}"#;

        let result = JsonCodec.decode_auth_response(body);

        assert!(matches!(result, Err(ProtocolError::InvalidPayload(_))));
    }
}
