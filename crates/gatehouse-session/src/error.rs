//! Error types for the session layer.
//!
//! Neither of these ever reaches a page: the store absorbs fetch errors by
//! logging the user out, and storage errors by logging a warning. They
//! exist so collaborators can say precisely what went wrong, and so the
//! store can record it for telemetry.

use gatehouse_protocol::ProtocolError;

/// A failure from the auth API collaborator.
///
/// The session store handles every variant the same way (forced logout);
/// the distinction only matters for logs and `last_error`.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A refresh was requested but no bearer token is persisted.
    #[error("no bearer token is persisted")]
    MissingToken,

    /// The token (or the credentials) were rejected: invalid or expired.
    #[error("unauthorized")]
    Unauthorized,

    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response arrived but could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(#[from] ProtocolError),

    /// The service refused the request for a stated reason, e.g. an email
    /// that is already registered.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// A failure of the durable token storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a valid key/value map.
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// The storage cannot be used at all (e.g. a poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
