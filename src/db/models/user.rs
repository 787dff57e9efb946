//! User records and queries.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::common::now_rfc3339;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password_hash: String,
    pub city: String,
    pub postal_office: i64,
    pub avatar: String,
    pub avatar_id: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Outward projection of a user. The password hash never leaves the db layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub postal_office: i64,
    pub avatar: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            city: user.city,
            postal_office: user.postal_office,
            avatar: user.avatar,
            role: user.role,
        }
    }
}

pub async fn find_user_by_phone(
    db: &SqlitePool,
    phone: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE phone = ?")
        .bind(phone)
        .fetch_optional(db)
        .await
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn create_user(
    db: &SqlitePool,
    first_name: &str,
    phone: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = now_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, first_name, phone, password_hash, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(first_name)
    .bind(phone)
    .bind(password_hash)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(db)
        .await
}

/// Profile fields settable through the profile update endpoint
#[derive(Debug, Clone)]
pub struct UserProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub postal_office: i64,
}

pub async fn update_user_profile(
    db: &SqlitePool,
    id: &str,
    update: &UserProfileUpdate,
) -> Result<User, sqlx::Error> {
    sqlx::query(
        "UPDATE users
         SET first_name = ?, last_name = ?, phone = ?, city = ?, postal_office = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone)
    .bind(&update.city)
    .bind(update.postal_office)
    .bind(now_rfc3339())
    .bind(id)
    .execute(db)
    .await?;

    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await
}

pub async fn update_user_avatar(
    db: &SqlitePool,
    id: &str,
    avatar: &str,
    avatar_id: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query("UPDATE users SET avatar = ?, avatar_id = ?, updated_at = ? WHERE id = ?")
        .bind(avatar)
        .bind(avatar_id)
        .bind(now_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = init_in_memory().await.unwrap();

        let user = create_user(&db, "Olena", "+380501234567", "hash")
            .await
            .unwrap();
        assert_eq!(user.first_name, "Olena");
        assert_eq!(user.role, "user");
        assert_eq!(user.last_name, "");
        assert_eq!(user.postal_office, 1);

        let found = find_user_by_phone(&db, "+380501234567").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);

        assert!(find_user_by_phone(&db, "+380000000000")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let db = init_in_memory().await.unwrap();

        create_user(&db, "Olena", "+380501234567", "hash")
            .await
            .unwrap();
        let err = create_user(&db, "Inna", "+380501234567", "hash2")
            .await
            .unwrap_err();
        assert!(crate::api::error::is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_profile_update() {
        let db = init_in_memory().await.unwrap();

        let user = create_user(&db, "Olena", "+380501234567", "hash")
            .await
            .unwrap();
        let updated = update_user_profile(
            &db,
            &user.id,
            &UserProfileUpdate {
                first_name: "Olena".to_string(),
                last_name: "Shevchenko".to_string(),
                phone: "+380501234567".to_string(),
                city: "Kyiv".to_string(),
                postal_office: 12,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.last_name, "Shevchenko");
        assert_eq!(updated.city, "Kyiv");
        assert_eq!(updated.postal_office, 12);
    }

    #[test]
    fn test_response_strips_password() {
        let user = User {
            id: "u1".to_string(),
            first_name: "Olena".to_string(),
            last_name: "".to_string(),
            phone: "+380501234567".to_string(),
            password_hash: "secret".to_string(),
            city: "".to_string(),
            postal_office: 1,
            avatar: "url".to_string(),
            avatar_id: "".to_string(),
            role: "user".to_string(),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password"));
    }
}
