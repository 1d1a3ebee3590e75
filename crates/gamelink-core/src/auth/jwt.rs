use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::LinkError;

/// Claims carried by a forum-minted bearer token. The forum signs these
/// with the shared HS256 secret; this service only validates.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Claims {
    /// Subject (forum account ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    fn for_account(account_id: i32, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let expires = now + Duration::hours(ttl_hours as i64);
        Claims {
            sub: account_id.to_string(),
            exp: expires.timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }
}

/// Mint a bearer token for an account. Stands in for the forum in tests
/// and local tooling; production tokens always come from the forum side.
pub fn mint(account_id: i32, secret: &str, ttl_hours: u64) -> Result<String, LinkError> {
    encode(
        &Header::default(),
        &Claims::for_account(account_id, ttl_hours),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| LinkError::Internal(format!("token minting failed: {}", e)))
}

/// Validate a bearer token and resolve the account it was minted for.
///
/// A bad signature, an expired token and a non-numeric subject all reject
/// as `Unauthorized`.
pub fn verify_bearer(token: &str, secret: &str) -> Result<i32, LinkError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| LinkError::Unauthorized(format!("Invalid bearer token: {}", e)))?;

    data.claims
        .sub
        .parse()
        .map_err(|_| LinkError::Unauthorized("Malformed subject claim".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_then_verify() {
        let token = mint(42, "secret", 1).unwrap();
        assert_eq!(verify_bearer(&token, "secret").unwrap(), 42);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = mint(42, "secret", 1).unwrap();
        let err = verify_bearer(&token, "other").unwrap_err();
        assert!(matches!(err, LinkError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_bearer("not-a-jwt", "secret").is_err());
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        let err = verify_bearer(&token, "secret").unwrap_err();
        assert!(matches!(err, LinkError::Unauthorized(_)));
    }
}
