//! Form-level validation for the login and register pages.
//!
//! A form runs every field's rule and keeps the first message per field,
//! so a page can show one error under each input at once.

use std::collections::BTreeMap;
use std::fmt;

use gatehouse_protocol::{LoginRequest, RegisterRequest};
use serde::Serialize;

use crate::{validate_email, validate_password, validate_username};

/// An input on one of the credential forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Username,
    Email,
    Password,
    ConfirmPassword,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => write!(f, "username"),
            Self::Email => write!(f, "email"),
            Self::Password => write!(f, "password"),
            Self::ConfirmPassword => write!(f, "confirm_password"),
        }
    }
}

/// Per-field validation messages for a rejected form.
///
/// Ordered by field so rendering and logging are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct FormErrors {
    errors: BTreeMap<Field, String>,
}

impl FormErrors {
    /// Returns the message for `field`, if it failed.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Iterates over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn check(&mut self, field: Field, outcome: Result<(), String>) {
        if let Err(message) = outcome {
            self.errors.insert(field, message);
        }
    }

    fn finish(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

// ---------------------------------------------------------------------------
// LoginForm
// ---------------------------------------------------------------------------

/// Raw input of the login page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Checks every field.
    ///
    /// # Errors
    /// Returns the collected [`FormErrors`] when any field fails.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check(Field::Email, validate_email(&self.email).into_result());
        errors.check(
            Field::Password,
            validate_password(&self.password).into_result(),
        );
        errors.finish()
    }

    /// Validates and converts into the request body for submission.
    ///
    /// # Errors
    /// Same as [`LoginForm::validate`].
    pub fn into_request(self) -> Result<LoginRequest, FormErrors> {
        self.validate()?;
        Ok(LoginRequest {
            email: self.email,
            password: self.password,
        })
    }
}

// ---------------------------------------------------------------------------
// RegisterForm
// ---------------------------------------------------------------------------

/// Raw input of the registration page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Checks every field, plus that both password inputs agree.
    ///
    /// # Errors
    /// Returns the collected [`FormErrors`] when any field fails.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        errors.check(
            Field::Username,
            validate_username(&self.username).into_result(),
        );
        errors.check(Field::Email, validate_email(&self.email).into_result());
        errors.check(
            Field::Password,
            validate_password(&self.password).into_result(),
        );
        if self.password != self.confirm_password {
            errors.check(
                Field::ConfirmPassword,
                Err("Passwords do not match".to_string()),
            );
        }
        errors.finish()
    }

    /// Validates and converts into the request body for submission.
    ///
    /// # Errors
    /// Same as [`RegisterForm::validate`].
    pub fn into_request(self) -> Result<RegisterRequest, FormErrors> {
        self.validate()?;
        Ok(RegisterRequest {
            username: self.username,
            email: self.email,
            password: self.password,
        })
    }
}
