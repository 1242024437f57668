//! # Registri
//!
//! `registri` is a small user signup and sign-in service.
//!
//! ## Signup
//!
//! `POST /user/signup` validates the payload (all fields at once, so the
//! client can surface every problem in one round trip), hashes the password
//! with Argon2id, and persists the user. The email uniqueness guarantee lives
//! in the store: the handler's check-then-create is not atomic, and a
//! concurrent signup racing past the existence check is reported as the same
//! "email taken" field error, driven by the store's duplicate-key rejection.
//!
//! ## Sign-in & sessions
//!
//! `POST /user/signin` verifies credentials and issues an opaque session
//! token delivered as an `HttpOnly` cookie. Only a hash of the token is
//! stored. Unknown emails and wrong passwords are indistinguishable in both
//! the response and the logs to prevent account enumeration.
//!
//! Persistence is consumed through the `UserStore` / `SessionStore` traits;
//! the Postgres implementations back the binary and in-memory implementations
//! back the tests.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
