//! Session types: what the client currently believes about who is logged in.

use gatehouse_protocol::{User, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Storage key the bearer token is persisted under.
    ///
    /// Default: `"token"`.
    pub token_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: "token".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A coherent snapshot of the session.
///
/// `is_loading` is `true` only while the bootstrap fetch or an explicit
/// refresh is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user: Option<User>,
    pub is_loading: bool,
}

impl Session {
    /// The state every store starts in.
    pub fn bootstrapping() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Which node of the state machine this snapshot is in.
    pub fn state(&self) -> SessionState {
        match (&self.user, self.is_loading) {
            (None, true) => SessionState::Bootstrapping,
            (Some(_), _) => SessionState::Authenticated,
            (None, false) => SessionState::Anonymous,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The session state machine:
///
/// ```text
///                  ┌──(token + fetch ok)──→ Authenticated ⟲ (refresh ok)
///  Bootstrapping ──┤                          │      ↑
///                  └──(no token / failed)─→ Anonymous ┘ (login)
///                                 (logout / failed refresh)
/// ```
///
/// `Bootstrapping` is transient: a store leaves it exactly once.
/// A refresh in flight while authenticated still reports `Authenticated`;
/// check `Session::is_loading` for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    Bootstrapping,
    Authenticated,
    Anonymous,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bootstrapping => write!(f, "Bootstrapping"),
            Self::Authenticated => write!(f, "Authenticated"),
            Self::Anonymous => write!(f, "Anonymous"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// Notifications for telemetry collaborators.
///
/// Purely informational: the session snapshot is the source of truth, and
/// a lagging or absent event subscriber never affects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// `login` stored a new user.
    LoggedIn(UserId),
    /// The session was cleared by `logout` or by a failed refresh.
    LoggedOut,
    /// A refresh replaced the user.
    Refreshed(UserId),
    /// A refresh failed and the session was reset to anonymous.
    RefreshFailed { reason: String },
    /// Bootstrap finished; `is_loading` is now `false`.
    Settled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrapping_session_is_loading_and_anonymous() {
        let session = Session::bootstrapping();
        assert!(session.is_loading);
        assert!(!session.is_authenticated());
        assert_eq!(session.state(), SessionState::Bootstrapping);
    }

    #[test]
    fn test_state_derivation() {
        let alice = User::new("1", "alice");

        let settled_anon = Session { user: None, is_loading: false };
        let settled_auth = Session { user: Some(alice.clone()), is_loading: false };
        let refreshing = Session { user: Some(alice), is_loading: true };

        assert_eq!(settled_anon.state(), SessionState::Anonymous);
        assert_eq!(settled_auth.state(), SessionState::Authenticated);
        assert_eq!(refreshing.state(), SessionState::Authenticated);
    }

    #[test]
    fn test_user_id_follows_user() {
        let session = Session {
            user: Some(User::new("7", "bob")),
            is_loading: false,
        };
        assert_eq!(session.user_id(), Some(&UserId::new("7")));
        assert_eq!(Session::bootstrapping().user_id(), None);
    }

    #[test]
    fn test_session_config_default_key() {
        assert_eq!(SessionConfig::default().token_key, "token");
    }

    #[test]
    fn test_session_config_partial_json_uses_defaults() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Anonymous.to_string(), "Anonymous");
    }
}
