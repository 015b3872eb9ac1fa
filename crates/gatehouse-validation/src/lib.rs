//! Credential input validation for Gatehouse.
//!
//! Two levels:
//!
//! 1. **Rules** ([`validate_email`], [`validate_password`],
//!    [`validate_username`]) — pure checks on a single string, returning a
//!    [`ValidationResult`] with the first failing message.
//! 2. **Forms** ([`LoginForm`], [`RegisterForm`]) — run the rules for every
//!    input of a page and collect one message per field in [`FormErrors`].
//!
//! Validation failures are values, never `Err` from the rules themselves;
//! the caller decides whether to block submission.

mod form;
mod rules;

pub use form::{Field, FormErrors, LoginForm, RegisterForm};
pub use rules::{
    PASSWORD_MIN_CHARS, USERNAME_MAX_CHARS, USERNAME_MIN_CHARS, ValidationResult,
    validate_email, validate_password, validate_username,
};
