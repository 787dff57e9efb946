//! Session records and queries.
//!
//! Tokens are stored as SHA-256 digests; the plaintext values exist only in
//! cookies. Expired rows are not swept proactively, they are rejected lazily
//! when a rotation or lookup touches them.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::now_rfc3339;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    pub access_expires_at: String,
    pub refresh_expires_at: String,
    pub created_at: String,
}

pub async fn insert_session(
    db: &SqlitePool,
    user_id: &str,
    access_token_hash: &str,
    refresh_token_hash: &str,
    access_expires_at: &str,
    refresh_expires_at: &str,
) -> Result<Session, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO sessions
         (id, user_id, access_token_hash, refresh_token_hash, access_expires_at, refresh_expires_at, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(access_token_hash)
    .bind(refresh_token_hash)
    .bind(access_expires_at)
    .bind(refresh_expires_at)
    .bind(now_rfc3339())
    .execute(db)
    .await?;

    sqlx::query_as("SELECT * FROM sessions WHERE id = ?")
        .bind(&id)
        .fetch_one(db)
        .await
}

pub async fn find_session_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM sessions WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_session_by_refresh_hash(
    db: &SqlitePool,
    refresh_token_hash: &str,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM sessions WHERE refresh_token_hash = ?")
        .bind(refresh_token_hash)
        .fetch_optional(db)
        .await
}

/// Delete every session owned by a user. A fresh login discards all prior
/// grants for that user.
pub async fn delete_sessions_for_user(db: &SqlitePool, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_session_by_id(db: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

/// Conditional delete keyed by the refresh digest. Returns the number of rows
/// removed; zero means another caller already claimed the token. This is the
/// serialization point that makes refresh tokens single-use under concurrent
/// rotation attempts.
pub async fn delete_session_by_refresh_hash(
    db: &SqlitePool,
    refresh_token_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE refresh_token_hash = ?")
        .bind(refresh_token_hash)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
