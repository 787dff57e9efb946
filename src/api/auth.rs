//! Authentication: registration, login, session lifecycle, and the
//! request-identity extractors.
//!
//! Sessions pair an access token with a single-use refresh token. Both are
//! opaque random values handed to the client in cookies and held server-side
//! as SHA-256 digests. Refresh rotates the pair: the old record is claimed
//! with a conditional delete so two concurrent rotations of the same token
//! cannot both succeed.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::{
    create_subscription, create_user, delete_session_by_id, delete_session_by_refresh_hash,
    delete_sessions_for_user, find_session_by_id, find_session_by_refresh_hash, find_user_by_id,
    find_user_by_phone, insert_session, DbPool, Session, User, UserResponse,
};
use crate::AppState;

use super::error::{is_unique_violation, ApiError};
use super::validation::{validate_email, validate_password, validate_phone, validate_register_name};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const SESSION_COOKIE: &str = "sessionId";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random opaque token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// A freshly created session with the plaintext tokens destined for cookies
#[derive(Debug)]
pub struct IssuedSession {
    pub session: Session,
    pub access_token: String,
    pub refresh_token: String,
}

/// Create a session for a user: fresh token pair, digests persisted
pub async fn create_session(
    db: &DbPool,
    auth: &AuthConfig,
    user_id: &str,
) -> Result<IssuedSession, sqlx::Error> {
    let access_token = generate_token();
    let refresh_token = generate_token();

    let now = Utc::now();
    let access_expires_at = (now + Duration::minutes(auth.access_ttl_minutes)).to_rfc3339();
    let refresh_expires_at = (now + Duration::days(auth.refresh_ttl_days)).to_rfc3339();

    let session = insert_session(
        db,
        user_id,
        &hash_token(&access_token),
        &hash_token(&refresh_token),
        &access_expires_at,
        &refresh_expires_at,
    )
    .await?;

    Ok(IssuedSession {
        session,
        access_token,
        refresh_token,
    })
}

/// A fresh login discards every prior session for the user before creating
/// the new one
pub async fn login_session(
    db: &DbPool,
    auth: &AuthConfig,
    user_id: &str,
) -> Result<IssuedSession, sqlx::Error> {
    delete_sessions_for_user(db, user_id).await?;
    create_session(db, auth, user_id).await
}

/// Rotate a refresh token: single use, expiry checked before the claim.
/// An expired token is rejected without deleting the record.
pub async fn rotate_session(
    db: &DbPool,
    auth: &AuthConfig,
    refresh_token: &str,
) -> Result<IssuedSession, ApiError> {
    let digest = hash_token(refresh_token);

    let session = find_session_by_refresh_hash(db, &digest)
        .await?
        .ok_or_else(ApiError::session_not_found)?;

    if is_expired(&session.refresh_expires_at)? {
        return Err(ApiError::session_expired());
    }

    // Conditional delete is the serialization point: a concurrent rotation
    // that already claimed the token leaves zero rows for us.
    if delete_session_by_refresh_hash(db, &digest).await? == 0 {
        return Err(ApiError::session_not_found());
    }

    Ok(create_session(db, auth, &session.user_id).await?)
}

fn is_expired(rfc3339: &str) -> Result<bool, ApiError> {
    let expires = DateTime::parse_from_rfc3339(rfc3339)
        .map_err(|_| ApiError::internal("Malformed session expiry"))?;
    Ok(Utc::now() > expires.with_timezone(&Utc))
}

fn build_cookie(name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Set the three session cookies. The refresh and session cookies live as
/// long as the refresh token; the access cookie expires with the access TTL.
pub fn session_cookies(jar: CookieJar, auth: &AuthConfig, issued: &IssuedSession) -> CookieJar {
    let access_age = time::Duration::minutes(auth.access_ttl_minutes);
    let refresh_age = time::Duration::days(auth.refresh_ttl_days);

    jar.add(build_cookie(
        ACCESS_COOKIE,
        issued.access_token.clone(),
        access_age,
    ))
    .add(build_cookie(
        SESSION_COOKIE,
        issued.session.id.clone(),
        refresh_age,
    ))
    .add(build_cookie(
        REFRESH_COOKIE,
        issued.refresh_token.clone(),
        refresh_age,
    ))
}

/// Clear all three session cookies, whether or not they were set
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/").build())
        .remove(Cookie::build(SESSION_COOKIE).path("/").build())
        .remove(Cookie::build(REFRESH_COOKIE).path("/").build())
}

fn raw_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Resolve a cookie: the parsed jar first, then a raw Cookie-header scan.
/// Two lookup attempts over the same transport, one resolution function.
pub fn cookie_value(jar: &CookieJar, headers: &HeaderMap, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| raw_cookie_value(headers, name))
}

// -------------------------------------------------------------------------
// Request handlers
// -------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Register a new user and open a session
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), ApiError> {
    validate_register_name(&req.first_name).map_err(ApiError::validation)?;
    validate_phone(&req.phone).map_err(ApiError::validation)?;
    validate_password(&req.password).map_err(ApiError::validation)?;

    if find_user_by_phone(&state.db, &req.phone).await?.is_some() {
        return Err(ApiError::conflict("Phone in use"));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    let user = create_user(&state.db, &req.first_name, &req.phone, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Phone in use")
            } else {
                ApiError::from(e)
            }
        })?;

    tracing::info!(user_id = %user.id, "User registered");

    let issued = create_session(&state.db, &state.config.auth, &user.id).await?;
    let jar = session_cookies(jar, &state.config.auth, &issued);

    Ok((StatusCode::CREATED, jar, Json(UserResponse::from(user))))
}

/// Authenticate by phone and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let user = find_user_by_phone(&state.db, &req.phone)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let issued = login_session(&state.db, &state.config.auth, &user.id).await?;
    let jar = session_cookies(jar, &state.config.auth, &issued);

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((jar, Json(UserResponse::from(user))))
}

/// End the session and clear cookies. Idempotent: succeeds with or without
/// a live session.
///
/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if let Some(session_id) = cookie_value(&jar, &headers, SESSION_COOKIE) {
        delete_session_by_id(&state.db, &session_id).await?;
    }

    if let Some(refresh_token) = cookie_value(&jar, &headers, REFRESH_COOKIE) {
        delete_session_by_refresh_hash(&state.db, &hash_token(&refresh_token)).await?;
    }

    Ok((clear_session_cookies(jar), StatusCode::NO_CONTENT))
}

/// Rotate the refresh token and reissue cookies
///
/// GET /api/auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let refresh_token = cookie_value(&jar, &headers, REFRESH_COOKIE)
        .ok_or_else(ApiError::session_not_found)?;

    let issued = rotate_session(&state.db, &state.config.auth, &refresh_token).await?;
    let jar = session_cookies(jar, &state.config.auth, &issued);

    Ok((jar, Json(json!({ "message": "Session refreshed" }))))
}

/// Current authenticated user
///
/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Add an email to the subscription list
///
/// POST /api/subscriptions
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_email(&req.email).map_err(ApiError::validation)?;

    create_subscription(&state.db, &req.email)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Email in use")
            } else {
                ApiError::from(e)
            }
        })?;

    Ok(Json(json!({ "message": "Successfully subscribed" })))
}

// -------------------------------------------------------------------------
// Identity extractors
// -------------------------------------------------------------------------

/// The acting identity on protected routes. Resolves the session and access
/// cookies, verifies the access token digest and its lifetime against the
/// stored session, and loads the owning user.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let session_id = cookie_value(&jar, &parts.headers, SESSION_COOKIE)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;
        let access_token = cookie_value(&jar, &parts.headers, ACCESS_COOKIE)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let session = find_session_by_id(&state.db, &session_id)
            .await?
            .ok_or_else(ApiError::session_not_found)?;

        if hash_token(&access_token) != session.access_token_hash {
            return Err(ApiError::unauthorized("Invalid access token"));
        }

        if is_expired(&session.access_expires_at)? {
            return Err(ApiError::new(
                super::error::ErrorCode::SessionExpired,
                "Access token expired",
            ));
        }

        let user = find_user_by_id(&state.db, &session.user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))?;

        Ok(CurrentUser(user))
    }
}

/// An authenticated user holding the admin role
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(ApiError::forbidden("Access restricted"));
        }

        Ok(AdminUser(user))
    }
}
