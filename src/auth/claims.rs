//! Access token claims (RFC 7519 registered claims only).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Payload of a signed access token.
///
/// Self-contained: the subject identity, issue and expiry instants and the
/// issuer marker are everything a verifier needs. Nothing here is looked
/// up in storage after minting.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id as a UUID string).
    pub sub: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issuer marker.
    pub iss: String,
}

impl Claims {
    pub fn new(subject: Uuid, ttl_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            iat: now,
            exp: now + ttl_seconds,
            iss: issuer,
        }
    }

    /// The subject identity carried by the token.
    pub fn subject(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::TokenMalformed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_subject_and_issuer() {
        let subject = Uuid::new_v4();
        let claims = Claims::new(subject, 3600, "murmur".to_string());

        assert_eq!(claims.sub, subject.to_string());
        assert_eq!(claims.iss, "murmur");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn subject_parses_back_to_uuid() {
        let subject = Uuid::new_v4();
        let claims = Claims::new(subject, 3600, "murmur".to_string());

        assert_eq!(claims.subject().expect("subject should parse"), subject);
    }

    #[test]
    fn garbled_subject_is_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), 3600, "murmur".to_string());
        claims.sub = "not-a-uuid".to_string();

        assert!(claims.subject().is_err());
    }
}
