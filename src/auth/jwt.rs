/// JWT Token Issuance and Verification
///
/// Access tokens and refresh tokens are both HS256 JWTs, each signed with
/// its own secret from `JwtSettings`.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::repository::User;

/// Create a short-lived access token with payload `{ userId }`
///
/// # Errors
/// Returns error if token encoding fails
pub fn create_access_token(user: &User, config: &JwtSettings) -> Result<String, AppError> {
    let claims = AccessClaims::new(user.id, config.access_token_expiry, config.issuer.clone());
    sign(&claims, &config.access_token_secret)
}

/// Create a long-lived refresh token with payload `{ userId, tokenVersion }`
///
/// # Errors
/// Returns error if token encoding fails
pub fn create_refresh_token(user: &User, config: &JwtSettings) -> Result<String, AppError> {
    let claims = RefreshClaims::new(
        user.id,
        user.token_version,
        config.refresh_token_expiry,
        config.issuer.clone(),
    );
    sign(&claims, &config.refresh_token_secret)
}

/// Verify signature, issuer and expiry of an access token
pub fn verify_access_token(token: &str, config: &JwtSettings) -> Result<AccessClaims, AppError> {
    verify(token, &config.access_token_secret, &config.issuer)
}

/// Verify signature, issuer and expiry of a refresh token
///
/// The token version is not checked here; that needs the stored user.
pub fn verify_refresh_token(token: &str, config: &JwtSettings) -> Result<RefreshClaims, AppError> {
    verify(token, &config.refresh_token_secret, &config.issuer)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str, issuer: &str) -> Result<T, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.leeway = 0;

    decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT validation error: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Auth(AuthError::TokenExpired),
                _ => AppError::Auth(AuthError::TokenInvalid),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            access_token_secret: "test-access-secret-at-least-32-characters".to_string(),
            refresh_token_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn test_user() -> User {
        User {
            id: 42,
            firstname: "Ursula".to_string(),
            lastname: "Le Guin".to_string(),
            email: "ursula@example.com".to_string(),
            password: "$2b$04$notarealhash".to_string(),
            phone: "555-0100".to_string(),
            token_version: 3,
        }
    }

    #[test]
    fn test_create_and_verify_access_token() {
        let config = get_test_config();
        let token = create_access_token(&test_user(), &config).expect("Failed to create token");
        let claims = verify_access_token(&token, &config).expect("Failed to verify token");

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_carries_token_version() {
        let config = get_test_config();
        let token = create_refresh_token(&test_user(), &config).expect("Failed to create token");
        let claims = verify_refresh_token(&token, &config).expect("Failed to verify token");

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.token_version, 3);
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_tokens_are_not_deterministic() {
        let config = get_test_config();
        let user = test_user();

        let first = create_access_token(&user, &config).unwrap();
        let second = create_access_token(&user, &config).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = get_test_config();
        config.access_token_expiry = -5;

        let token = create_access_token(&test_user(), &config).unwrap();
        let result = verify_access_token(&token, &config);

        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenExpired))));
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let config = get_test_config();
        let token = create_access_token(&test_user(), &config).unwrap();

        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{}.{}", head, chars.into_iter().collect::<String>());

        let result = verify_access_token(&tampered, &config);
        assert!(matches!(result, Err(AppError::Auth(AuthError::TokenInvalid))));
    }

    #[test]
    fn test_invalid_token() {
        let config = get_test_config();
        assert!(verify_access_token("invalid.token.here", &config).is_err());
        assert!(verify_access_token("", &config).is_err());
    }

    #[test]
    fn test_secrets_are_not_interchangeable() {
        let config = get_test_config();
        let user = test_user();

        let access = create_access_token(&user, &config).unwrap();
        let refresh = create_refresh_token(&user, &config).unwrap();

        assert!(verify_refresh_token(&access, &config).is_err());
        assert!(verify_access_token(&refresh, &config).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        let token = create_access_token(&test_user(), &config).unwrap();

        config.issuer = "wrong-issuer".to_string();
        assert!(verify_access_token(&token, &config).is_err());
    }
}
