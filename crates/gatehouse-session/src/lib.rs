//! Client session management for Gatehouse.
//!
//! This crate tracks who is logged in on this client:
//!
//! 1. **Identity lookup** — the [`AuthApi`] collaborator trait
//! 2. **Persistence** — the bearer token in [`TokenStorage`]
//!    ([`MemoryStorage`], [`FileStorage`])
//! 3. **State** — the [`SessionStore`] state machine, observed through
//!    [`SessionView`]s and [`SessionEvent`]s
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard layer (above)  ← decides redirects from the session
//!     ↕
//! Session layer (this crate)  ← owns the session and the persisted token
//!     ↕
//! Protocol layer (below)  ← provides User, AuthResponse
//! ```

#![allow(async_fn_in_trait)]

mod api;
mod dev;
mod error;
mod session;
mod storage;
mod store;

pub use api::AuthApi;
pub use dev::DevAuthApi;
pub use error::{FetchError, StorageError};
pub use session::{Session, SessionConfig, SessionEvent, SessionState};
pub use storage::{FileStorage, MemoryStorage, TokenStorage};
pub use store::{SessionStore, SessionView};
