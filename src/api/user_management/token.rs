use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::models::User;
use crate::settings::Settings;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

pub fn issue_token(user: &User, settings: &Settings) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(settings.token_ttl_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, settings: &Settings) -> jsonwebtoken::errors::Result<TokenClaims> {
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str, ttl: i64) -> Settings {
        Settings {
            database_url: String::new(),
            image_folder: String::new(),
            jwt_secret: secret.to_string(),
            token_ttl_hours: ttl,
            public_url: String::new(),
        }
    }

    fn user() -> User {
        User {
            id: 42,
            first_name: "Ana".to_string(),
            last_name: "Rojas".to_string(),
            handle: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let settings = settings("secret", 24);
        let token = issue_token(&user(), &settings).unwrap();
        let claims = verify_token(&token, &settings).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.email, "ana@example.com");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&user(), &settings("secret", 24)).unwrap();
        assert!(verify_token(&token, &settings("other", 24)).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let settings = settings("secret", -2);
        let token = issue_token(&user(), &settings).unwrap();
        assert!(verify_token(&token, &settings).is_err());
    }

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
