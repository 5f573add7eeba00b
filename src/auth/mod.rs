//! Authentication core: credential hashing, access token mint/verify,
//! refresh token lifecycle and the request gateway.

mod claims;
mod gateway;
mod jwt;
mod password;
mod refresh_token;

pub use claims::Claims;
pub use gateway::authenticate;
pub use gateway::extract_bearer;
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::issue_refresh_token;
pub use refresh_token::redeem_refresh_token;
pub use refresh_token::revoke_refresh_token;
