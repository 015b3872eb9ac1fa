//! Unified error type for the Gatehouse meta-crate.

use std::path::PathBuf;

use gatehouse_protocol::ProtocolError;
use gatehouse_session::{FetchError, StorageError};
use gatehouse_validation::FormErrors;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GatehouseError {
    /// Form input failed client-side validation; nothing was submitted.
    #[error(transparent)]
    Invalid(#[from] FormErrors),

    /// The auth collaborator rejected or failed the request.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A protocol-level error (encode, decode, invalid payload).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Token persistence failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded or applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from loading configuration or installing the log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid log filter: {0}")]
    LogFilter(String),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

#[cfg(test)]
mod tests {
    use gatehouse_validation::LoginForm;

    use super::*;

    #[test]
    fn test_from_form_errors() {
        let errors = LoginForm::new("nope", "short").validate().unwrap_err();
        let err: GatehouseError = errors.into();
        assert!(matches!(err, GatehouseError::Invalid(_)));
        assert!(err.to_string().contains("failed validation"));
    }

    #[test]
    fn test_from_fetch_error() {
        let err: GatehouseError = FetchError::Unauthorized.into();
        assert!(matches!(err, GatehouseError::Fetch(_)));
        assert_eq!(err.to_string(), "unauthorized");
    }

    #[test]
    fn test_from_protocol_error() {
        let err: GatehouseError = ProtocolError::InvalidPayload("bad".into()).into();
        assert!(matches!(err, GatehouseError::Protocol(_)));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_storage_error() {
        let err: GatehouseError = StorageError::Unavailable("locked".into()).into();
        assert!(matches!(err, GatehouseError::Storage(_)));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn test_from_config_error() {
        let err: GatehouseError = ConfigError::Invalid {
            field: "guard.login_path",
            reason: "must start with '/'".into(),
        }
        .into();
        assert!(matches!(err, GatehouseError::Config(_)));
        assert!(err.to_string().contains("guard.login_path"));
    }

    #[test]
    fn test_config_read_error_names_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/etc/gatehouse.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/etc/gatehouse.json"));
    }
}
