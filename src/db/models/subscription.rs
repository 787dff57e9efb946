//! Email subscription records.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::now_rfc3339;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

/// Insert a subscription. The unique index on email rejects duplicates.
pub async fn create_subscription(db: &SqlitePool, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO subscriptions (id, email, created_at) VALUES (?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(email)
        .bind(now_rfc3339())
        .execute(db)
        .await?;
    Ok(())
}
