//! The auth API collaborator.
//!
//! Gatehouse doesn't talk to a server itself. It defines the [`AuthApi`]
//! trait: the three calls the session layer and the login/register pages
//! need. Implement it over your HTTP client of choice; use
//! [`DevAuthApi`](crate::DevAuthApi) or a scripted mock in tests.

use std::future::Future;
use std::sync::Arc;

use gatehouse_protocol::{AuthResponse, LoginRequest, RegisterRequest, User};

use crate::FetchError;

/// Credential exchange and identity lookup.
///
/// `Send + Sync + 'static` because the store may be driven from spawned
/// tasks and lives as long as the client.
///
/// # Example
///
/// ```rust
/// use gatehouse_protocol::{AuthResponse, LoginRequest, RegisterRequest, User};
/// use gatehouse_session::{AuthApi, FetchError};
///
/// /// Knows exactly one user and one token.
/// struct SingleUserApi;
///
/// impl AuthApi for SingleUserApi {
///     async fn current_user(&self, token: &str) -> Result<User, FetchError> {
///         if token == "tok" {
///             Ok(User::new("1", "alice"))
///         } else {
///             Err(FetchError::Unauthorized)
///         }
///     }
///
///     async fn login(&self, _: &LoginRequest) -> Result<AuthResponse, FetchError> {
///         Ok(AuthResponse { token: "tok".into(), user: User::new("1", "alice") })
///     }
///
///     async fn register(&self, _: &RegisterRequest) -> Result<AuthResponse, FetchError> {
///         Err(FetchError::Rejected("registration closed".into()))
///     }
/// }
/// ```
pub trait AuthApi: Send + Sync + 'static {
    /// Returns the profile the bearer `token` belongs to.
    ///
    /// # Returns
    /// - `Ok(User)` — the token is valid
    /// - `Err(_)` — invalid/expired token, network failure, or a malformed
    ///   response; the store treats them all alike
    fn current_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<User, FetchError>> + Send;

    /// Exchanges credentials for a token + user pair.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, FetchError>> + Send;

    /// Creates an account and returns its token + user pair.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<AuthResponse, FetchError>> + Send;
}

/// A shared collaborator, e.g. one directory behind several clients.
impl<T: AuthApi> AuthApi for Arc<T> {
    fn current_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<User, FetchError>> + Send {
        (**self).current_user(token)
    }

    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, FetchError>> + Send {
        (**self).login(request)
    }

    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<AuthResponse, FetchError>> + Send {
        (**self).register(request)
    }
}
