use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use crate::auth::jwt::{self, Claims};
use crate::error::AppError;

/// Outcome of inspecting a request's bearer token. Token problems never
/// surface as errors; they yield `Anonymous`.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Authenticated(Claims),
    Anonymous,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap, secret: Option<&str>) -> Self {
        let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() else {
            return Identity::Anonymous;
        };
        let Some(secret) = secret else {
            return Identity::Anonymous;
        };

        match jwt::decode_token(bearer.token(), secret) {
            Ok(claims) => Identity::Authenticated(claims),
            Err(e) => {
                tracing::debug!("Ignoring bearer token: {e}");
                Identity::Anonymous
            }
        }
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Identity::Authenticated(claims) => Some(claims),
            Identity::Anonymous => None,
        }
    }

    pub fn require(&self) -> Result<&Claims, AppError> {
        self.claims()
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }
}

/// Reads the identity attached by `middleware::auth::attach_identity`;
/// routes outside that layer always see `Anonymous`.
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or(Identity::Anonymous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn token(secret: &str) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::now_v7(),
            username: "johndoe".to_string(),
            email: "johndoe@example.com".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        jwt::encode_token(&claims, secret).unwrap()
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(Identity::from_headers(&HeaderMap::new(), Some("secret")), Identity::Anonymous);
    }

    #[test]
    fn valid_token_is_authenticated() {
        let headers = headers(&format!("Bearer {}", token("secret")));
        let identity = Identity::from_headers(&headers, Some("secret"));
        assert_eq!(identity.claims().map(|c| c.username.as_str()), Some("johndoe"));
    }

    #[test]
    fn bad_tokens_fall_back_to_anonymous() {
        let forged = headers(&format!("Bearer {}", token("other")));
        assert_eq!(Identity::from_headers(&forged, Some("secret")), Identity::Anonymous);

        let garbage = headers("Bearer not.a.jwt");
        assert_eq!(Identity::from_headers(&garbage, Some("secret")), Identity::Anonymous);

        let basic = headers("Basic dXNlcjpwYXNz");
        assert_eq!(Identity::from_headers(&basic, Some("secret")), Identity::Anonymous);

        let valid = headers(&format!("Bearer {}", token("secret")));
        assert_eq!(Identity::from_headers(&valid, None), Identity::Anonymous);
    }

    #[test]
    fn require_rejects_anonymous() {
        assert!(matches!(
            Identity::Anonymous.require(),
            Err(AppError::Unauthorized(_))
        ));
    }
}
