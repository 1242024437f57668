//! In-memory stores.
//!
//! Back the test suite and are handy for local runs without Postgres. The
//! single lock in [`MemoryUserStore::create`] makes check-and-insert atomic,
//! which is where its uniqueness guarantee comes from.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    generate_session_token, hash_session_token, Identity, NewUser, SessionRecord, SessionStore,
    StoreError, User, UserStore,
};

/// `UserStore` backed by a map keyed on email.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().await.get(email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            address: user.address,
            postal_code: user.postal_code,
            password_hash: user.password_hash,
        };
        users.insert(user.email.clone(), user.clone());

        Ok(user)
    }
}

struct MemorySession {
    record: SessionRecord,
    expires_at: Instant,
}

/// `SessionStore` keeping hashed tokens in a map.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<Vec<u8>, MemorySession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, identity: &Identity, ttl_seconds: i64) -> Result<String, StoreError> {
        let token = generate_session_token()?;
        let ttl = Duration::from_secs(u64::try_from(ttl_seconds).unwrap_or(0));

        self.sessions.lock().await.insert(
            hash_session_token(&token),
            MemorySession {
                record: SessionRecord {
                    email: identity.email.clone(),
                    name: identity.name.clone(),
                },
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(token)
    }

    async fn lookup(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        let sessions = self.sessions.lock().await;

        Ok(sessions
            .get(&hash_session_token(token))
            .filter(|session| session.expires_at > Instant::now())
            .map(|session| session.record.clone()))
    }

    async fn delete(&self, token: &str) -> Result<(), StoreError> {
        self.sessions.lock().await.remove(&hash_session_token(token));
        Ok(())
    }
}
