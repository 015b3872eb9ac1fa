//! An in-memory [`AuthApi`] for development, demos, and tests.
//!
//! Keeps accounts and issued tokens in process memory. Never use it in
//! production: passwords are stored as given.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use gatehouse_protocol::{AuthResponse, LoginRequest, RegisterRequest, User};
use rand::Rng;
use tokio::sync::Mutex;

use crate::{AuthApi, FetchError};

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct Directory {
    /// Accounts keyed by email.
    accounts: HashMap<String, Account>,
    /// Issued bearer tokens → account email.
    tokens: HashMap<String, String>,
}

/// In-memory credential service.
#[derive(Default)]
pub struct DevAuthApi {
    directory: Mutex<Directory>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl DevAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account directly and returns a token for it, as if the
    /// user had signed up in an earlier run.
    pub async fn seed(&self, username: &str, email: &str, password: &str) -> AuthResponse {
        let mut dir = self.directory.lock().await;
        let user = self.new_user(username, email);
        dir.accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        let token = issue(&mut dir, email);
        AuthResponse { token, user }
    }

    /// Invalidates a token, as an expiry on the server would.
    pub async fn revoke(&self, token: &str) -> bool {
        self.directory.lock().await.tokens.remove(token).is_some()
    }

    /// While offline every call fails with `FetchError::Network`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), FetchError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(FetchError::Network("dev auth api is offline".into()))
        } else {
            Ok(())
        }
    }

    fn new_user(&self, username: &str, email: &str) -> User {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        User::new(id.to_string(), username).with_email(email)
    }
}

impl AuthApi for DevAuthApi {
    async fn current_user(&self, token: &str) -> Result<User, FetchError> {
        self.check_online()?;
        let dir = self.directory.lock().await;
        dir.tokens
            .get(token)
            .and_then(|email| dir.accounts.get(email))
            .map(|account| account.user.clone())
            .ok_or(FetchError::Unauthorized)
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, FetchError> {
        self.check_online()?;
        let mut dir = self.directory.lock().await;
        let user = match dir.accounts.get(&request.email) {
            Some(account) if account.password == request.password => account.user.clone(),
            _ => return Err(FetchError::Unauthorized),
        };
        let token = issue(&mut dir, &request.email);
        tracing::debug!(user_id = %user.id, "dev api issued token");
        Ok(AuthResponse { token, user })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, FetchError> {
        self.check_online()?;
        let mut dir = self.directory.lock().await;
        if dir.accounts.contains_key(&request.email) {
            return Err(FetchError::Rejected("email is already registered".into()));
        }
        if dir
            .accounts
            .values()
            .any(|account| account.user.username == request.username)
        {
            return Err(FetchError::Rejected("username is taken".into()));
        }
        let user = self.new_user(&request.username, &request.email);
        dir.accounts.insert(
            request.email.clone(),
            Account {
                user: user.clone(),
                password: request.password.clone(),
            },
        );
        let token = issue(&mut dir, &request.email);
        Ok(AuthResponse { token, user })
    }
}

/// Records a fresh token for `email` and returns it.
fn issue(dir: &mut Directory, email: &str) -> String {
    let token = generate_token();
    dir.tokens.insert(token.clone(), email.to_string());
    token
}

/// A random 32-character hex string (128 bits).
fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
