//! Request authentication gateway.
//!
//! The single composition point between inbound headers and the token
//! verifier: pull the bearer credential out of the request, verify it,
//! hand back the authenticated claims. Every protected handler goes
//! through here (via the `BearerAuth` middleware) instead of repeating
//! extract-and-validate logic inline.

use actix_web::http::header::{self, HeaderMap};

use crate::auth::claims::Claims;
use crate::auth::jwt::validate_access_token;
use crate::configuration::AuthSettings;
use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from the `Authorization` header.
///
/// Exactly one header with the `Bearer` scheme and a non-empty value is
/// accepted. A missing header, duplicated headers, a foreign scheme and
/// an empty credential all produce the same failure, so a caller cannot
/// tell which rule it tripped.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    let mut values = headers.get_all(header::AUTHORIZATION);

    let value = values.next().ok_or(AuthError::MissingBearerHeader)?;
    if values.next().is_some() {
        return Err(AuthError::MissingBearerHeader);
    }

    let value = value.to_str().map_err(|_| AuthError::MissingBearerHeader)?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MissingBearerHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingBearerHeader);
    }

    Ok(token.to_string())
}

/// Authenticate a request from its headers.
///
/// Composes bearer extraction with access-token verification; any failure
/// from either stage surfaces as one unauthenticated outcome. Stateless —
/// nothing persists across calls.
pub fn authenticate(headers: &HeaderMap, config: &AuthSettings) -> Result<Claims, AuthError> {
    let token = extract_bearer(headers)?;
    validate_access_token(&token, config)
}
