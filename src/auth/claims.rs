/// JWT Claims structures
///
/// Payloads for the two token kinds. `userId` and `tokenVersion` keep the
/// camelCase names clients decode.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessClaims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    /// Random token id; keeps two tokens issued in the same second distinct
    pub jti: String,
}

/// Claims carried by a refresh token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RefreshClaims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    #[serde(rename = "tokenVersion")]
    pub token_version: i32,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

impl AccessClaims {
    pub fn new(user_id: i32, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user_id,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

impl RefreshClaims {
    pub fn new(user_id: i32, token_version: i32, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user_id,
            token_version,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_creation() {
        let claims = AccessClaims::new(7, 900, "test".to_string());

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.iss, "test");
    }

    #[test]
    fn test_payload_field_names() {
        let claims = RefreshClaims::new(3, 2, 60, "test".to_string());
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["userId"], 3);
        assert_eq!(json["tokenVersion"], 2);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_token_ids_are_unique() {
        let first = AccessClaims::new(1, 60, "test".to_string());
        let second = AccessClaims::new(1, 60, "test".to_string());
        assert_ne!(first.jti, second.jti);
    }
}
