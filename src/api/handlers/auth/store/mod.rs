//! Persistence seams for users and sessions.
//!
//! Handlers consume these traits instead of a pool so the full stack can run
//! against Postgres in production and against the in-memory stores in tests.
//! Whatever the backend, it owns the email uniqueness guarantee: `create`
//! must reject a second write for an email that passed the caller's lookup.

use anyhow::Context;
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// A persisted user record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    /// PHC string; never the plaintext password.
    pub password_hash: String,
}

/// A user record ready to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub password_hash: String,
}

/// Minimal identity claims established by credential verification and bound
/// to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Claims a live session resolves back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Write rejected by the uniqueness guarantee (here: `users.email`).
    #[error("duplicate key")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// User persistence consumed by the signup and sign-in handlers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-sensitive lookup by trimmed email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user.
    ///
    /// Returns [`StoreError::Duplicate`] when the email is already taken,
    /// including the race where it was taken after the caller's lookup.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Session persistence: opaque tokens out, identity claims back in.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a session and return the raw token for the cookie. Only a hash
    /// of the token is stored.
    async fn create(&self, identity: &Identity, ttl_seconds: i64) -> Result<String, StoreError>;

    /// Resolve a raw token to its claims, if the session is still live.
    async fn lookup(&self, token: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Drop a session; deleting an unknown token is not an error.
    async fn delete(&self, token: &str) -> Result<(), StoreError>;
}

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; stores keep a hash.
pub(crate) fn generate_session_token() -> Result<String, StoreError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a session token so raw values never reach the store.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}
