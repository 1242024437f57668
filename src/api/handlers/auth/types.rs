//! Request/response types for the auth endpoints.
//!
//! Wire names are camelCase to match the client form field names, which is
//! what lets the client map each returned error back onto its input.
//! Passwords deserialize into [`SecretString`] so `Debug` output and traces
//! stay redacted.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Signup payload.
///
/// Every field defaults when absent; presence is the validator's job so a
/// missing field becomes a field error instead of a deserialization failure.
#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
    #[serde(default)]
    #[schema(value_type = String, format = Password)]
    pub confirm_password: SecretString,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Sign-in payload.
#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
}

/// A validation failure attached to one named input field.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// JSON field name in the request ("email", "confirmPassword", ...).
    pub name: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}

/// 400 body: the complete list of problems, never just the first one.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessages {
    pub error_messages: Vec<FieldError>,
}

/// Identity claims for an authenticated session.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SessionResponse {
    pub email: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use secrecy::ExposeSecret;

    #[test]
    fn signup_request_uses_camel_case_wire_names() -> Result<()> {
        let request: SignupRequest = serde_json::from_value(serde_json::json!({
            "email": "alice@example.com",
            "name": "Alice",
            "password": "hunter2hunter2",
            "confirmPassword": "hunter2hunter2",
            "postalCode": "12345",
        }))?;

        assert_eq!(request.email, "alice@example.com");
        assert_eq!(request.password.expose_secret(), "hunter2hunter2");
        assert_eq!(request.confirm_password.expose_secret(), "hunter2hunter2");
        assert_eq!(request.postal_code.as_deref(), Some("12345"));
        assert_eq!(request.address, None);
        Ok(())
    }

    #[test]
    fn missing_fields_default_instead_of_failing() -> Result<()> {
        let request: SignupRequest = serde_json::from_value(serde_json::json!({}))?;

        assert_eq!(request.email, "");
        assert_eq!(request.password.expose_secret(), "");
        assert_eq!(request.confirm_password.expose_secret(), "");
        Ok(())
    }

    #[test]
    fn debug_output_redacts_passwords() {
        let request: SignupRequest = serde_json::from_value(serde_json::json!({
            "email": "alice@example.com",
            "name": "Alice",
            "password": "super-secret-password",
            "confirmPassword": "super-secret-password",
        }))
        .expect("valid payload");

        let debug = format!("{request:?}");
        assert!(!debug.contains("super-secret-password"), "{debug}");
        assert!(debug.contains("alice@example.com"));
    }

    #[test]
    fn error_messages_serialize_to_the_wire_shape() -> Result<()> {
        let body = ErrorMessages {
            error_messages: vec![FieldError::new("email", "Email is a required field")],
        };

        let value = serde_json::to_value(&body)?;
        let entries = value
            .get("errorMessages")
            .and_then(serde_json::Value::as_array)
            .context("missing errorMessages")?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["name"], "email");
        assert_eq!(entries[0]["message"], "Email is a required field");
        Ok(())
    }
}
