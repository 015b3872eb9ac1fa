//! `Client`: one session store plus the submission flows around it.
//!
//! This is the entry point for an application. It ties the layers
//! together: validation → auth collaborator → session store → guards.

use gatehouse_guard::{GuardConfig, Navigator, PageIntent, PageRender, RedirectGuard, render_state};
use gatehouse_protocol::{AuthResponse, User};
use gatehouse_session::{
    AuthApi, Session, SessionConfig, SessionStore, SessionView, TokenStorage,
};
use gatehouse_validation::{LoginForm, RegisterForm};

use crate::{AppConfig, GatehouseError};

/// Builder for a [`Client`].
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse::prelude::*;
///
/// let client = ClientBuilder::new()
///     .config(&AppConfig::load("gatehouse.json")?)
///     .build(FileStorage::new("session.json"), my_api);
/// client.start().await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    session_config: SessionConfig,
    guard_config: GuardConfig,
}

impl ClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the session and guard sections of `config`.
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.session_config = config.session.clone();
        self.guard_config = config.guard.clone();
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn guard_config(mut self, config: GuardConfig) -> Self {
        self.guard_config = config;
        self
    }

    /// Creates the client's session store. Nothing is read from `storage`
    /// until [`Client::start`].
    pub fn build<A: AuthApi, S: TokenStorage>(self, storage: S, api: A) -> Client<A, S> {
        Client {
            store: SessionStore::new(self.session_config, storage, api),
            guard_config: self.guard_config,
        }
    }
}

/// A client-side session with its guards and submission flows.
///
/// Cheap to clone; all clones share one session store.
pub struct Client<A: AuthApi, S: TokenStorage> {
    store: SessionStore<A, S>,
    guard_config: GuardConfig,
}

impl<A: AuthApi, S: TokenStorage> Clone for Client<A, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            guard_config: self.guard_config.clone(),
        }
    }
}

impl<A: AuthApi, S: TokenStorage> Client<A, S> {
    /// Restores the persisted session. Call once, after mounting any guards
    /// that should observe the bootstrap.
    ///
    /// # Panics
    /// If called a second time.
    pub async fn start(&self) {
        self.store.bootstrap().await;
    }

    pub fn store(&self) -> &SessionStore<A, S> {
        &self.store
    }

    pub fn session(&self) -> Session {
        self.store.session()
    }

    pub fn view(&self) -> SessionView {
        self.store.view()
    }

    pub fn guard_config(&self) -> &GuardConfig {
        &self.guard_config
    }

    /// Mounts a redirect guard for a page with `intent`.
    pub fn guard(&self, intent: PageIntent, navigator: impl Navigator) -> RedirectGuard {
        RedirectGuard::mount(intent, self.view(), navigator, self.guard_config.clone())
    }

    /// What a page with `intent` should render right now.
    pub fn render(&self, intent: PageIntent) -> PageRender {
        render_state(intent, &self.session())
    }

    /// Validates `form`, exchanges the credentials for a token, and logs in.
    ///
    /// # Errors
    /// - [`GatehouseError::Invalid`] if the form fails validation; the
    ///   collaborator is not called.
    /// - [`GatehouseError::Fetch`] if the collaborator rejects the request.
    /// - [`GatehouseError::Protocol`] if the response carries no token.
    ///
    /// The session is untouched on error.
    pub async fn sign_in(&self, form: LoginForm) -> Result<User, GatehouseError> {
        let request = form.into_request()?;
        let response = self.store.api().login(&request).await.inspect_err(|e| {
            tracing::info!(error = %e, "sign-in rejected");
        })?;
        self.accept(response)
    }

    /// Validates `form`, registers the account, and logs in as it.
    ///
    /// # Errors
    /// Same as [`sign_in`](Self::sign_in).
    pub async fn sign_up(&self, form: RegisterForm) -> Result<User, GatehouseError> {
        let request = form.into_request()?;
        let response = self.store.api().register(&request).await.inspect_err(|e| {
            tracing::info!(error = %e, "sign-up rejected");
        })?;
        self.accept(response)
    }

    /// Logs out. Idempotent.
    pub fn sign_out(&self) {
        self.store.logout();
    }

    /// Re-fetches the current user; logs out if that fails.
    pub async fn refresh(&self) {
        self.store.refresh_user().await;
    }

    /// Disposes the session store. Mounted guards stop.
    pub fn shutdown(&self) {
        self.store.dispose();
    }

    fn accept(&self, response: AuthResponse) -> Result<User, GatehouseError> {
        response.validate()?;
        let AuthResponse { token, user } = response;
        self.store.login(&token, user.clone());
        Ok(user)
    }
}
