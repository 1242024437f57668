//! Postgres-backed stores.
//!
//! The unique index on `users.email` (see `sql/schema.sql`) backs duplicate
//! detection: the signup handler's check-then-create is not atomic, so the
//! insert maps unique violations to [`StoreError::Duplicate`] instead of
//! treating them as fatal.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{
    generate_session_token, hash_session_token, Identity, NewUser, SessionRecord, SessionStore,
    StoreError, User, UserStore,
};

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn backend(err: sqlx::Error, what: &'static str) -> StoreError {
    StoreError::Backend(anyhow::Error::new(err).context(what))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query =
            "SELECT id, email, name, address, postal_code, password_hash FROM users WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| backend(err, "failed to look up user by email"))?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            email: row.get("email"),
            name: row.get("name"),
            address: row.get("address"),
            postal_code: row.get("postal_code"),
            password_hash: row.get("password_hash"),
        }))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let query = r"
        INSERT INTO users (email, name, address, postal_code, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.address)
            .bind(&user.postal_code)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        let id: Uuid = match row {
            Ok(row) => row.get("id"),
            Err(err) if is_unique_violation(&err) => return Err(StoreError::Duplicate),
            Err(err) => return Err(backend(err, "failed to insert user")),
        };

        Ok(User {
            id,
            email: user.email,
            name: user.name,
            address: user.address,
            postal_code: user.postal_code,
            password_hash: user.password_hash,
        })
    }
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, identity: &Identity, ttl_seconds: i64) -> Result<String, StoreError> {
        let query = r"
        INSERT INTO user_sessions (user_id, session_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        // Regenerate on a session_hash collision.
        for _ in 0..3 {
            let token = generate_session_token()?;
            let token_hash = hash_session_token(&token);
            let result = sqlx::query(query)
                .bind(identity.id)
                .bind(&token_hash)
                .bind(ttl_seconds)
                .execute(&self.pool)
                .instrument(span.clone())
                .await;

            match result {
                Ok(_) => return Ok(token),
                Err(err) if is_unique_violation(&err) => {}
                Err(err) => return Err(backend(err, "failed to insert session")),
            }
        }

        Err(StoreError::Backend(anyhow!(
            "failed to generate unique session token"
        )))
    }

    async fn lookup(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        // Only unexpired sessions resolve.
        let query = r"
        SELECT users.email, users.name
        FROM user_sessions
        JOIN users ON users.id = user_sessions.user_id
        WHERE user_sessions.session_hash = $1
          AND user_sessions.expires_at > NOW()
    ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(hash_session_token(token))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| backend(err, "failed to look up session"))?;

        Ok(row.map(|row| SessionRecord {
            email: row.get("email"),
            name: row.get("name"),
        }))
    }

    async fn delete(&self, token: &str) -> Result<(), StoreError> {
        let query = "DELETE FROM user_sessions WHERE session_hash = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_session_token(token))
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| backend(err, "failed to delete session"))?;

        Ok(())
    }
}
