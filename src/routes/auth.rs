// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::{PasswordResetToken, User};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

/// Reset tokens stay valid for one hour.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/reset-password/confirm", post(confirm_reset))
}

/// Email format check shared by register, login, and reset.
fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Session established by register or login.
#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub uid: String,
    pub email: String,
    pub message: String,
}

/// Register a new account with email and password.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("Invalid email or password".to_string()));
    }
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "All the fields must be filled".to_string(),
        ));
    }

    if state
        .store
        .get_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        tracing::info!(email = %payload.email, "Registration rejected: email already in use");
        return Err(AppError::BadRequest("Registration failed.".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User {
        uid: Uuid::new_v4().to_string(),
        email: payload.email.clone(),
        password_hash,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.store.upsert_user(&user).await?;

    tracing::info!(uid = %user.uid, "User registered");

    session_response(&state, jar, &user, "Registration successful")
}

/// Log in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("Invalid email or password".to_string()));
    }
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "All the fields must be filled".to_string(),
        ));
    }

    // A missing account and a wrong password are indistinguishable to the
    // caller.
    let user = state
        .store
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::info!(uid = %user.uid, "Login rejected: wrong password");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(uid = %user.uid, "User logged in");

    session_response(&state, jar, &user, "Login successful")
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, Json(serde_json::json!({ "message": "Logged out" })))
}

#[derive(Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub email: String,
}

/// Request a password reset email.
///
/// Responds identically whether or not the account exists, so the
/// endpoint cannot be used to probe for registered addresses.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<serde_json::Value>> {
    if payload.email.is_empty() {
        return Err(AppError::Validation("Enter your email".to_string()));
    }
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("Invalid email or password".to_string()));
    }

    if let Some(user) = state.store.get_user_by_email(&payload.email).await? {
        let token = PasswordResetToken {
            token: Uuid::new_v4().to_string(),
            uid: user.uid.clone(),
            expires_at: format_utc_rfc3339(
                chrono::Utc::now() + chrono::Duration::hours(RESET_TOKEN_TTL_HOURS),
            ),
        };
        state.store.put_reset_token(&token).await?;

        // Mail delivery is external; the mailer consumes the token record.
        tracing::info!(uid = %user.uid, "Password reset email requested");
    } else {
        tracing::info!(email = %payload.email, "Password reset for unknown email, ignoring");
    }

    Ok(Json(
        serde_json::json!({ "message": "Email with reset link sent!" }),
    ))
}

#[derive(Deserialize)]
pub struct ConfirmResetRequest {
    pub token: String,
    #[serde(default)]
    pub password: String,
}

/// Exchange a reset token for a new password.
async fn confirm_reset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConfirmResetRequest>,
) -> Result<Json<serde_json::Value>> {
    if payload.password.is_empty() {
        return Err(AppError::Validation(
            "All the fields must be filled".to_string(),
        ));
    }

    fn invalid() -> AppError {
        AppError::BadRequest("Invalid or expired reset token".to_string())
    }

    let token = state
        .store
        .get_reset_token(&payload.token)
        .await?
        .ok_or_else(invalid)?;

    let expired = chrono::DateTime::parse_from_rfc3339(&token.expires_at)
        .map(|at| at.with_timezone(&chrono::Utc) < chrono::Utc::now())
        // An unparseable expiry counts as expired.
        .unwrap_or(true);
    if expired {
        state.store.delete_reset_token(&payload.token).await?;
        return Err(invalid());
    }

    let mut user = state.store.get_user(&token.uid).await?.ok_or_else(invalid)?;
    user.password_hash = hash_password(&payload.password)?;
    state.store.upsert_user(&user).await?;
    state.store.delete_reset_token(&payload.token).await?;

    tracing::info!(uid = %user.uid, "Password reset completed");

    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

// ─── Password Hashing ────────────────────────────────────────────

/// Hash a password with Argon2id and a random salt (PHC string format).
fn hash_password(password: &str) -> Result<String> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use argon2::Argon2;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored PHC hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use argon2::Argon2;

    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored hash unreadable: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Build the session token, set the cookie, and shape the response.
fn session_response(
    state: &AppState,
    jar: CookieJar,
    user: &User,
    message: &str,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = create_jwt(&user.uid, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let jar = jar.add(
        Cookie::build((SESSION_COOKIE, token.clone()))
            .path("/")
            .http_only(true),
    );

    Ok((
        jar,
        Json(SessionResponse {
            token,
            uid: user.uid.clone(),
            email: user.email.clone(),
            message: message.to_string(),
        }),
    ))
}
