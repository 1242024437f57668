use crate::api::handlers::{auth, health};
use utoipa::OpenApi;

/// `OpenAPI` document served at `/api-docs/openapi.json` and rendered by the
/// Swagger UI. New endpoints are registered here so the document stays
/// complete.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::signup::signup,
        auth::signin::signin,
        auth::session::session,
        auth::session::logout,
    ),
    components(schemas(
        auth::types::SignupRequest,
        auth::types::SigninRequest,
        auth::types::FieldError,
        auth::types::ErrorMessages,
        auth::types::SessionResponse,
    )),
    tags(
        (name = "signup", description = "User registration"),
        (name = "auth", description = "Credential sign-in and sessions"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
