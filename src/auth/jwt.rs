use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

/// Returned in place of a signed token when no secret is configured.
pub const UNSIGNED_TOKEN: &str = "Optional implementation";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, ttl: Duration) -> Result<Self, String> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| format!("token lifetime {ttl} is out of range"))?;
        Ok(Self {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

/// Issue a login token, or the unsigned sentinel when no secret is configured.
pub fn issue(user: &User, secret: Option<&str>, ttl: Duration) -> Result<String, String> {
    match secret {
        Some(secret) => encode_token(&Claims::new(user, ttl)?, secret),
        None => Ok(UNSIGNED_TOKEN.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            username: "johndoe".to_string(),
            email: "johndoe@example.com".to_string(),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_token_decodes_to_identity() {
        let user = user();
        let token = issue(&user, Some("secret"), Duration::hours(1)).unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "johndoe");
        assert_eq!(claims.email, "johndoe@example.com");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(&user(), Some("secret"), Duration::hours(1)).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(&user(), Duration::hours(1)).unwrap();
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = encode_token(&claims, "secret").unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        assert!(issue(&user(), Some("secret"), Duration::MAX).is_err());
    }

    #[test]
    fn missing_secret_yields_sentinel() {
        assert_eq!(issue(&user(), None, Duration::hours(1)).unwrap(), UNSIGNED_TOKEN);
        assert!(decode_token("garbage", "secret").is_err());
    }
}
