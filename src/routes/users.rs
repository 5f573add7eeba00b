//! User account routes: creation and credential updates.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, Claims};
use crate::error::AppError;
use crate::validators::is_valid_email;

/// Email/password pair used both to create an account and to replace its
/// credentials.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// User representation returned by the API. The credential hash never
/// appears here.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub is_premium: bool,
}

/// POST /api/users
///
/// Create a user from an email and password.
///
/// # Errors
/// - 400: invalid email
/// - 409: email already registered
/// - 500: storage failure
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let password_hash = hash_password(&form.password)?;

    let user_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO users (id, created_at, updated_at, email, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(now)
    .bind(now)
    .bind(&email)
    .bind(&password_hash)
    .execute(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user_id, "user created");

    Ok(HttpResponse::Created().json(UserResponse {
        id: user_id.to_string(),
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
        email,
        is_premium: false,
    }))
}

/// PUT /api/users
///
/// Replace the authenticated user's email and password wholesale.
///
/// # Errors
/// - 400: invalid email
/// - 401: missing or invalid access token (middleware)
/// - 404: the subject no longer exists
/// - 409: email already taken
pub async fn update_user(
    claims: web::ReqData<Claims>,
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.subject()?;
    let email = is_valid_email(&form.email)?;
    let password_hash = hash_password(&form.password)?;

    let now = Utc::now();
    let (created_at, is_premium) = sqlx::query_as::<_, (DateTime<Utc>, bool)>(
        r#"
        UPDATE users
        SET email = $1, password_hash = $2, updated_at = $3
        WHERE id = $4
        RETURNING created_at, is_premium
        "#,
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(now)
    .bind(user_id)
    .fetch_one(pool.get_ref())
    .await?;

    tracing::info!(user_id = %user_id, "user credentials updated");

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user_id.to_string(),
        created_at: created_at.to_rfc3339(),
        updated_at: now.to_rfc3339(),
        email,
        is_premium,
    }))
}
