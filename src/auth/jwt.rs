//! Access token minting and verification.
//!
//! Tokens are HS256-signed JWTs carrying the subject identity, issue and
//! expiry instants and an issuer marker. Verification distinguishes four
//! failure kinds (tampered, expired, unparseable, foreign issuer) so the
//! gateway can log precisely while the client sees a uniform rejection.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

/// Mint a signed access token for a subject.
///
/// The requested lifetime is capped at `config.access_token_ttl`; asking
/// for more silently yields a token with the maximum lifetime, never an
/// error.
pub fn generate_access_token(
    subject: &Uuid,
    config: &AuthSettings,
    ttl_seconds: i64,
) -> Result<String, AppError> {
    let ttl = ttl_seconds.min(config.access_token_ttl);
    let claims = Claims::new(*subject, ttl, config.issuer.clone());

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token generation failed: {}", e)))
}

/// Verify a token string and return its claims.
pub fn validate_access_token(token: &str, config: &AuthSettings) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    // No clock slack: a token is dead the instant its expiry passes.
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
            AuthError::TokenSignatureInvalid
        }
        ErrorKind::InvalidIssuer => AuthError::TokenWrongIssuer,
        _ => AuthError::TokenMalformed,
    })
}
