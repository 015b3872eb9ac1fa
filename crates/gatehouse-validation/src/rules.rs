//! Field-level validation rules.
//!
//! Each rule is a pure, total function: it never panics and never returns
//! `Err`. The first failing check wins; errors are not aggregated.

use serde::Serialize;

/// Shortest accepted password, in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Accepted username length range, in characters.
pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 20;

/// Outcome of validating a single input.
///
/// Built fresh by every call; there is no shared result object to mutate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    /// A passing result.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    /// A failing result carrying a human-readable message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }

    /// Converts into a `Result`, handy for `?` in form validation.
    pub fn into_result(self) -> Result<(), String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }
}

/// Validates an email address.
///
/// Accepts `local@domain.tld` where no part contains whitespace or `@`,
/// and the domain has a `.` with at least one character on each side.
/// No case folding is applied.
pub fn validate_email(value: &str) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::invalid("Email is required");
    }
    if !is_email_shaped(value) {
        return ValidationResult::invalid("Invalid email format");
    }
    ValidationResult::valid()
}

/// Validates a password: present and at least [`PASSWORD_MIN_CHARS`] long.
pub fn validate_password(value: &str) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::invalid("Password is required");
    }
    if value.chars().count() < PASSWORD_MIN_CHARS {
        return ValidationResult::invalid("Password must be at least 8 characters");
    }
    ValidationResult::valid()
}

/// Validates a username: 3-20 characters from `[A-Za-z0-9_]`.
pub fn validate_username(value: &str) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::invalid("Username is required");
    }
    let len = value.chars().count();
    if len < USERNAME_MIN_CHARS {
        return ValidationResult::invalid("Username must be at least 3 characters");
    }
    if len > USERNAME_MAX_CHARS {
        return ValidationResult::invalid("Username must be at most 20 characters");
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return ValidationResult::invalid(
            "Username can only contain letters, numbers, and underscores",
        );
    }
    ValidationResult::valid()
}

/// Matches `^[^\s@]+@[^\s@]+\.[^\s@]+$`, with `\s` as in browser regexes
/// (see [`is_pattern_space`]).
fn is_email_shaped(value: &str) -> bool {
    if value.chars().any(is_pattern_space) {
        return false;
    }
    // No whitespace left, so every character is either `@` or allowed.
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // The domain needs a dot that is neither its first nor last character.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// The `\s` class of ECMAScript regexes: the Unicode space separators,
/// tab, vertical tab, form feed, BOM and the four line terminators.
///
/// Differs from [`char::is_whitespace`]: U+FEFF is included, U+0085 is not.
fn is_pattern_space(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}
