//! Field-level input validation.
//!
//! Request payloads are checked before any write reaches the database. Every failing
//! rule is collected into a [`FieldErrors`] map keyed by field name so a client sees all
//! problems with a submission at once, e.g.
//!
//! ```json
//! {"age": ["Age must be between 0 and 150."], "phone": ["This field may not be blank."]}
//! ```
//!
//! Errors that do not belong to a single field go under [`NON_FIELD_ERRORS`].

use crate::config::PasswordConfig;
use crate::errors::Error;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;
use validator::ValidateEmail;

/// Key for errors that concern the request as a whole
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const BLANK: &str = "This field may not be blank.";
pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const PHONE_TOO_SHORT: &str = "Phone number must be at least 10 characters.";

pub const PHONE_MIN_LENGTH: usize = 10;
pub const PHONE_MAX_LENGTH: usize = 20;
pub const NAME_MAX_LENGTH: usize = 255;
pub const EMAIL_MAX_LENGTH: usize = 255;

/// Passwords rejected outright regardless of length or composition
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "admin123",
    "welcome1",
    "letmein1",
    "11111111",
    "abc12345",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "trustno1",
    "monkey123",
];

/// Validation failures keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding a single message for a single field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` if nothing was recorded, otherwise the map itself
    pub fn check(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// `Ok(())` if nothing was recorded, otherwise a validation error carrying the map
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() { Ok(()) } else { Err(Error::Validation(self)) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

pub fn max_length_message(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Reject blank values and values longer than `max` characters
pub fn text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
    } else if value.chars().count() > max {
        errors.add(field, max_length_message(max));
    }
}

/// Phone numbers are free text between 10 and 20 characters
pub fn phone(errors: &mut FieldErrors, field: &str, value: &str) {
    let len = value.chars().count();
    if value.trim().is_empty() {
        errors.add(field, BLANK);
    } else if len > PHONE_MAX_LENGTH {
        errors.add(field, max_length_message(PHONE_MAX_LENGTH));
    } else if len < PHONE_MIN_LENGTH {
        errors.add(field, PHONE_TOO_SHORT);
    }
}

/// Inclusive integer range check with a caller-supplied message
pub fn range(errors: &mut FieldErrors, field: &str, value: i32, min: i32, max: i32, message: &str) {
    if !(min..=max).contains(&value) {
        errors.add(field, message);
    }
}

/// Validate an email address and return its normalized form (trimmed, lower-cased).
///
/// Returns `None` after recording an error when the address is blank, too long, or
/// not syntactically valid.
pub fn email(errors: &mut FieldErrors, field: &str, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if trimmed.chars().count() > EMAIL_MAX_LENGTH {
        errors.add(field, max_length_message(EMAIL_MAX_LENGTH));
        return None;
    }
    if !trimmed.validate_email() {
        errors.add(field, INVALID_EMAIL);
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Normalize an email address for lookups without validating it
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Check a new password against the configured strength policy.
///
/// `attributes` are (label, value) pairs describing the account, e.g. `("email
/// address", "alice")`; a password that contains one of them (or is contained in one)
/// is rejected as too similar. Values shorter than three characters are ignored.
pub fn password_strength(password: &str, config: &PasswordConfig, attributes: &[(&str, &str)]) -> Vec<String> {
    let mut problems = Vec::new();
    let len = password.chars().count();

    if len < config.min_length {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            config.min_length
        ));
    }
    if len > config.max_length {
        problems.push(format!(
            "This password is too long. It must contain at most {} characters.",
            config.max_length
        ));
    }

    let lowered = password.to_lowercase();
    for (label, value) in attributes {
        let value = value.trim().to_lowercase();
        if value.chars().count() < 3 {
            continue;
        }
        if lowered.contains(&value) || value.contains(&lowered) {
            problems.push(format!("The password is too similar to the {label}."));
            break;
        }
    }

    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}
