/// Authentication module
///
/// Password hashing/verification and access/refresh token issuance.

mod claims;
mod jwt;
mod password;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use jwt::create_access_token;
pub use jwt::create_refresh_token;
pub use jwt::verify_access_token;
pub use jwt::verify_refresh_token;
pub use password::hash_password;
pub use password::verify_password;

/// Name of the http-only cookie carrying the refresh token
pub const REFRESH_COOKIE_NAME: &str = "jid";
