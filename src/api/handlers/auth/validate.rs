//! Field validation for signup and sign-in payloads.
//!
//! Validation never fails fast: every rule runs so the caller can report all
//! problems at once. Errors are keyed by the JSON field name the client sent.

use regex::Regex;
use secrecy::ExposeSecret;

use super::types::{FieldError, SigninRequest, SignupRequest};

/// Normalized signup record, ready to hash and persist.
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
}

/// Email lookups are case-sensitive, so normalization is trim-only.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Validate a signup payload, collecting every field error in field order.
pub fn validate_signup(request: &SignupRequest) -> Result<NewSignup, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = normalize_email(&request.email);
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is a required field"));
    } else if !valid_email(&email) {
        errors.push(FieldError::new("email", "Email must be a valid email"));
    }

    let name = request.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is a required field"));
    }

    let password = request.password.expose_secret();
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is a required field"));
    } else if password.chars().count() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }

    // A missing confirmation deserializes as empty, so it only ever matches an
    // empty password, which the required check above already rejects.
    if request.confirm_password.expose_secret() != password {
        errors.push(FieldError::new("confirmPassword", "Passwords must match"));
    }

    if errors.is_empty() {
        Ok(NewSignup {
            email,
            name: name.to_string(),
            address: optional_field(request.address.as_deref()),
            postal_code: optional_field(request.postal_code.as_deref()),
        })
    } else {
        Err(errors)
    }
}

/// Validate a sign-in payload, returning the normalized email.
pub fn validate_signin(request: &SigninRequest) -> Result<String, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = normalize_email(&request.email);
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is a required field"));
    } else if !valid_email(&email) {
        errors.push(FieldError::new("email", "Email must be a valid email"));
    }

    if request.password.expose_secret().is_empty() {
        errors.push(FieldError::new("password", "Password is a required field"));
    }

    if errors.is_empty() {
        Ok(email)
    } else {
        Err(errors)
    }
}

fn optional_field(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
