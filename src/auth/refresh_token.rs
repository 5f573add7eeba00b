//! Refresh token management.
//!
//! Refresh tokens are opaque 64-character random strings handed to the
//! client once; the server persists only their SHA-256 digest together
//! with the owning subject, expiry and a nullable revocation timestamp.
//! Redeeming never rotates the token or extends its lifetime; revoking is
//! an idempotent no-op for unknown or already-revoked tokens, so a caller
//! can never use the revoke endpoint to probe which tokens exist.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// 64 alphanumeric characters, ~380 bits of entropy from the thread-local
/// CSPRNG.
const TOKEN_LENGTH: usize = 64;

/// Generate a new opaque refresh token.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Digest used as the storage key. Plaintext tokens are never persisted.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a refresh token for a subject and persist its record.
///
/// Collisions are treated as negligible at this entropy width; the
/// primary-key constraint on the digest stays authoritative regardless.
pub async fn issue_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let token = generate_refresh_token();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token_hash, user_id, created_at, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(now)
    .bind(now + Duration::seconds(ttl_seconds))
    .execute(pool)
    .await?;

    Ok(token)
}

/// Exchange a refresh token for its owning subject identity.
///
/// Usable iff the record exists, is unrevoked and unexpired — all judged
/// from a single fetched row. Minting the replacement access token is the
/// caller's job; this neither mints nor touches the record.
pub async fn redeem_refresh_token(pool: &PgPool, token: &str) -> Result<Uuid, AppError> {
    let record = sqlx::query_as::<_, (Uuid, DateTime<Utc>, Option<DateTime<Utc>>)>(
        r#"
        SELECT user_id, expires_at, revoked_at
        FROM refresh_tokens
        WHERE token_hash = $1
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?;

    match record {
        None => Err(AuthError::RefreshTokenNotFound.into()),
        Some((user_id, expires_at, revoked_at)) => {
            if revoked_at.is_some() {
                tracing::warn!(user_id = %user_id, "attempt to redeem a revoked refresh token");
                return Err(AuthError::RefreshTokenRevoked.into());
            }
            if Utc::now() >= expires_at {
                tracing::info!(user_id = %user_id, "refresh token expired");
                return Err(AuthError::RefreshTokenExpired.into());
            }
            Ok(user_id)
        }
    }
}

/// Mark a refresh token revoked.
///
/// Succeeds whether or not the token exists or was already revoked; the
/// revocation timestamp is written at most once.
pub async fn revoke_refresh_token(pool: &PgPool, token: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked_at = $1
        WHERE token_hash = $2 AND revoked_at IS NULL
        "#,
    )
    .bind(Utc::now())
    .bind(hash_token(token))
    .execute(pool)
    .await?;

    Ok(())
}
