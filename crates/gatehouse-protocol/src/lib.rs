//! Payload types for the Gatehouse auth API.
//!
//! This crate defines what the client and the credential-exchange service
//! send each other:
//!
//! - **Types** ([`User`], [`AuthResponse`], [`LoginRequest`],
//!   [`RegisterRequest`]) — the shapes on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those shapes are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! ```text
//! AuthApi (bytes) → Protocol (User, AuthResponse) → Session (who is logged in)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{AuthResponse, LoginRequest, RegisterRequest, User, UserId};
