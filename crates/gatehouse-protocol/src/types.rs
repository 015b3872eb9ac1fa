//! Payload types exchanged with the auth API.
//!
//! These are the structures the client receives from (or sends to) the
//! credential-exchange service: the user profile, the token + user pair a
//! successful login returns, and the request bodies for login and register.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Server-assigned identifier for a user.
///
/// The client never interprets it; it only compares and logs it.
/// `#[serde(transparent)]` keeps it a bare string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a `UserId` from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user profile as returned by the current-user endpoint.
///
/// The session layer treats this as an opaque record: it is stored and
/// replaced wholesale, never patched field by field. Server-specific
/// fields the client has no type for land in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable identity.
    pub id: UserId,

    /// Display / login name.
    pub username: String,

    /// Contact address, when the server discloses it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Everything else the server sent about the user.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// Creates a user with no email and no extra attributes.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(id),
            username: username.into(),
            email: None,
            attributes: serde_json::Map::new(),
        }
    }

    /// Builder-style setter for the email field.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Login / register
// ---------------------------------------------------------------------------

/// Successful login or registration: a bearer token and the profile it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer token. Never parsed by the client.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

impl AuthResponse {
    /// Checks that the response carries a usable token.
    ///
    /// # Errors
    /// `ProtocolError::InvalidPayload` if the token is empty or blank.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.token.trim().is_empty() {
            return Err(ProtocolError::InvalidPayload(
                "auth response carries an empty token".into(),
            ));
        }
        Ok(())
    }
}

/// Body of a login submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a registration submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Display for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The password is never shown.
        write!(f, "login({}, ********)", self.email)
    }
}

impl fmt::Display for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "register({}, {}, ********)", self.username, self.email)
    }
}
