//! # Gatehouse
//!
//! Client-side session and auth redirect layer.
//!
//! Gatehouse tracks whether the visitor holds a valid bearer token, restores
//! that state on startup, keeps it consistent across login and logout, and
//! redirects pages whose auth requirement the current session violates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gatehouse::prelude::*;
//!
//! # async fn run() -> Result<(), GatehouseError> {
//! let config = AppConfig::load("gatehouse.json")?.with_env_overrides();
//! init_tracing(&config.log)?;
//!
//! let client = ClientBuilder::new()
//!     .config(&config)
//!     .build(FileStorage::new("session.json"), DevAuthApi::new());
//! let _guard = client.guard(PageIntent::RequireAuth, |path: &str| println!("go to {path}"));
//! client.start().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod logging;

pub use client::{Client, ClientBuilder};
pub use config::{
    AppConfig, ENV_LANDING_PATH, ENV_LOG, ENV_LOGIN_PATH, ENV_TOKEN_KEY, LogConfig, LogFormat,
};
pub use error::{ConfigError, GatehouseError};
pub use logging::init_tracing;

/// Re-exports everything an application needs.
pub mod prelude {
    pub use crate::{
        AppConfig, Client, ClientBuilder, ConfigError, GatehouseError, LogConfig, LogFormat,
        init_tracing,
    };
    pub use gatehouse_guard::{
        GuardConfig, Navigator, PageIntent, PageRender, RecordingNavigator, Redirect,
        RedirectGuard, decide, render_state,
    };
    pub use gatehouse_protocol::{AuthResponse, LoginRequest, RegisterRequest, User, UserId};
    pub use gatehouse_session::{
        AuthApi, DevAuthApi, FetchError, FileStorage, MemoryStorage, Session, SessionConfig,
        SessionEvent, SessionState, SessionStore, SessionView, StorageError, TokenStorage,
    };
    pub use gatehouse_validation::{
        Field, FormErrors, LoginForm, RegisterForm, ValidationResult, validate_email,
        validate_password, validate_username,
    };
}
