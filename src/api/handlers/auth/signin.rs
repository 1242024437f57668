use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, instrument};

use super::{
    password::verify_password,
    session::session_cookie,
    state::AuthConfig,
    store::{Identity, SessionStore, UserStore},
    types::{ErrorMessages, SessionResponse, SigninRequest},
    validate::validate_signin,
};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; callers must not distinguish the two.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Check a password against the stored hash for `email`.
///
/// A missing user and a mismatched password collapse into the same error, and
/// neither is logged separately: responses and logs stay free of account
/// existence hints.
pub async fn verify_credentials(
    store: &dyn UserStore,
    email: &str,
    password: &SecretString,
) -> Result<Identity, AuthError> {
    let user = match store.find_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AuthError::InvalidCredentials),
        Err(e) => {
            return Err(AuthError::Internal(
                anyhow::Error::new(e).context("failed to look up user"),
            ))
        }
    };

    if verify_password(password.expose_secret(), &user.password_hash)? {
        Ok(Identity {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

#[utoipa::path(
    post,
    path = "/user/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = SessionResponse),
        (status = 400, description = "Validation failed", body = ErrorMessages),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "auth"
)]
// axum handler for signin
#[instrument(skip_all)]
pub async fn signin(
    user_store: Extension<Arc<dyn UserStore>>,
    session_store: Extension<Arc<dyn SessionStore>>,
    config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<SigninRequest>>,
) -> Response {
    let request: SigninRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    debug!("signin request: {:?}", request);

    let email = match validate_signin(&request) {
        Ok(email) => email,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorMessages {
                    error_messages: errors,
                }),
            )
                .into_response()
        }
    };

    let identity = match verify_credentials(user_store.as_ref(), &email, &request.password).await {
        Ok(identity) => identity,
        Err(AuthError::InvalidCredentials) => {
            // One line for both causes
            debug!("credential verification failed");
            return (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            )
                .into_response();
        }
        Err(AuthError::Internal(e)) => {
            error!("Error verifying credentials: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error signing in".to_string(),
            )
                .into_response();
        }
    };

    let token = match session_store
        .create(&identity, config.session_ttl_seconds())
        .await
    {
        Ok(token) => token,
        Err(e) => {
            error!("Error creating session: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error signing in".to_string(),
            )
                .into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match session_cookie(&config, &token) {
        Ok(cookie) => headers.insert(SET_COOKIE, cookie),
        Err(e) => {
            error!("Error building session cookie: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error signing in".to_string(),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        headers,
        Json(SessionResponse {
            email: identity.email,
            name: identity.name,
        }),
    )
        .into_response()
}
