use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    password::hash_password,
    store::{NewUser, StoreError, UserStore},
    types::{ErrorMessages, FieldError, SignupRequest},
    validate::validate_signup,
};

#[utoipa::path(
    post,
    path = "/user/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Validation failed or email already taken", body = ErrorMessages),
        (status = 500, description = "Storage failure"),
    ),
    tag = "signup"
)]
// axum handler for signup
#[instrument(skip_all)]
pub async fn signup(
    user_store: Extension<Arc<dyn UserStore>>,
    payload: Option<Json<SignupRequest>>,
) -> Response {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    // SecretString fields print redacted
    debug!("signup request: {:?}", request);

    // Every field error at once, never just the first
    let new_signup = match validate_signup(&request) {
        Ok(new_signup) => new_signup,
        Err(errors) => return field_errors(errors),
    };

    // check if user exists
    match user_store.find_by_email(&new_signup.email).await {
        Ok(Some(_)) => return email_taken(),
        Ok(None) => (),
        Err(e) => {
            error!("Error checking if user exists: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            )
                .into_response();
        }
    }

    let password_hash = match hash_password(request.password.expose_secret()) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Error hashing password: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            )
                .into_response();
        }
    };

    let record = NewUser {
        email: new_signup.email,
        name: new_signup.name,
        address: new_signup.address,
        postal_code: new_signup.postal_code,
        password_hash,
    };

    match user_store.create(record).await {
        Ok(_) => StatusCode::CREATED.into_response(),
        // A concurrent signup with the same email won the race between the
        // lookup above and this insert; report it the same way.
        Err(StoreError::Duplicate) => email_taken(),
        Err(e) => {
            error!("Error inserting user: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error creating user".to_string(),
            )
                .into_response()
        }
    }
}

fn field_errors(errors: Vec<FieldError>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorMessages {
            error_messages: errors,
        }),
    )
        .into_response()
}

fn email_taken() -> Response {
    field_errors(vec![FieldError::new("email", "Email is already taken")])
}
