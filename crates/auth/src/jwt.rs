use crate::error::{AuthError, Result};
use chrono::{Duration, Utc};
use ecclesia_models::Role;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // User ID
    pub role: Role,  // Role embedded at login time
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub jti: String, // JWT ID (unique identifier)
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a valid user id".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    token_ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            token_ttl: Duration::hours(1),
        }
    }

    /// Generate a bearer token carrying the user's id and role
    pub fn generate_token(&self, user_id: i64, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.token_ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate signature and expiry, returning the embedded claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_token() {
        let jwt = JwtService::new("test-secret-key-min-32-characters-long");

        let token = jwt
            .generate_token(42, Role::Admin)
            .expect("Failed to generate token");

        let claims = jwt
            .validate_token(&token)
            .expect("Failed to validate token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let jwt = JwtService::new("test-secret-key-min-32-characters-long");
        let other = JwtService::new("a-completely-different-secret-key!!");

        let token = jwt.generate_token(1, Role::Member).unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let jwt = JwtService::new("test-secret-key-min-32-characters-long");

        let mut token = jwt.generate_token(1, Role::Member).unwrap();
        // Flip a character in the payload segment.
        let flipped = if token.ends_with('a') { 'b' } else { 'a' };
        token.pop();
        token.push(flipped);

        assert!(jwt.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let secret = "test-secret-key-min-32-characters-long";
        let jwt = JwtService::new(secret);

        let now = Utc::now();
        let claims = Claims {
            sub: "1".to_string(),
            role: Role::Member,
            exp: (now - Duration::minutes(5)).timestamp(),
            iat: (now - Duration::hours(2)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            jwt.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_malformed_subject_is_an_invalid_token() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            role: Role::Member,
            exp: 0,
            iat: 0,
            jti: String::new(),
        };
        assert!(matches!(
            claims.user_id(),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
