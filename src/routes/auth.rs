//! Session routes: login, access-token refresh and refresh-token
//! revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    extract_bearer, generate_access_token, issue_refresh_token, redeem_refresh_token,
    revoke_refresh_token, verify_password,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the user plus a fresh session.
#[derive(Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub is_premium: bool,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// POST /api/login
///
/// Verify credentials, then mint an access token and persist a new
/// refresh token. An unknown email and a wrong password are
/// indistinguishable from outside.
///
/// # Errors
/// - 401: incorrect email or password
/// - 500: storage failure
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let record = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>, String, String, bool)>(
        r#"
        SELECT id, created_at, updated_at, email, password_hash, is_premium
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(&form.email)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or(AuthError::CredentialMismatch)?;

    let (user_id, created_at, updated_at, email, password_hash, is_premium) = record;

    if !verify_password(&form.password, &password_hash) {
        return Err(AuthError::CredentialMismatch.into());
    }

    let access_token =
        generate_access_token(&user_id, auth_config.get_ref(), auth_config.access_token_ttl)?;
    let refresh_token =
        issue_refresh_token(pool.get_ref(), user_id, auth_config.refresh_token_ttl).await?;

    tracing::info!(user_id = %user_id, "login succeeded");

    Ok(HttpResponse::Ok().json(SessionResponse {
        id: user_id.to_string(),
        created_at: created_at.to_rfc3339(),
        updated_at: updated_at.to_rfc3339(),
        email,
        is_premium,
        token: access_token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Exchange a still-valid refresh token (presented as a bearer
/// credential) for a fresh access token. The refresh token itself is
/// neither rotated nor extended.
///
/// # Errors
/// - 401: missing, unknown, expired or revoked refresh token
/// - 500: storage failure
pub async fn refresh(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    auth_config: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let token = extract_bearer(req.headers())?;
    let user_id = redeem_refresh_token(pool.get_ref(), &token).await?;

    let access_token =
        generate_access_token(&user_id, auth_config.get_ref(), auth_config.access_token_ttl)?;

    tracing::info!(user_id = %user_id, "access token refreshed");

    Ok(HttpResponse::Ok().json(RefreshResponse {
        token: access_token,
    }))
}

/// POST /api/revoke
///
/// Revoke the presented refresh token. Always responds 204 whether or
/// not the token existed, so the endpoint cannot be used to enumerate
/// live tokens.
///
/// # Errors
/// - 401: missing bearer header
/// - 500: storage failure
pub async fn revoke(req: HttpRequest, pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let token = extract_bearer(req.headers())?;
    revoke_refresh_token(pool.get_ref(), &token).await?;

    Ok(HttpResponse::NoContent().finish())
}
