//! Bearer token issuing and verification (HS256 JWT).

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atelier_core::{Role, UserId};

/// Errors from token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, format or claims are invalid, or the token has expired.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// The subject claim is not a user id.
    #[error("invalid token subject: {0:?}")]
    Subject(String),

    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub role: Role,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expiry (seconds since the epoch).
    pub exp: i64,
}

impl Claims {
    /// The user id named by `sub`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Subject`] if `sub` is not a positive integer.
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::Subject(self.sub.clone()))
    }
}

/// Verified identity extracted from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// Issue a token for `user_id` with `role`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if signing fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat,
            exp: iat.saturating_add(ttl),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Verify a token and return its principal.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for bad signatures, malformed tokens or
    /// expired tokens, and [`TokenError::Subject`] for a malformed subject.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(TokenError::Invalid)?;

        Ok(Principal {
            user_id: data.claims.user_id()?,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "k8#Qz!2vR7mW@x4Lp9$Tn3&Yb6*Hc1^Fd";

    fn service(ttl_secs: u64) -> TokenService {
        TokenService::new(&SecretString::from(SECRET), Duration::from_secs(ttl_secs))
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service(3600);
        let token = tokens.issue(UserId::new(42), Role::Admin).unwrap();
        let principal = tokens.verify(&token).unwrap();
        assert_eq!(principal.user_id, UserId::new(42));
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let other = TokenService::new(
            &SecretString::from("Zq9!mX2@pL7#wR4$tN8%vB3^cY6&hJ1*"),
            Duration::from_secs(3600),
        );
        let token = other.issue(UserId::new(1), Role::Admin).unwrap();
        assert!(matches!(
            service(3600).verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let tokens = service(3600);
        let iat = Utc::now().timestamp() - 7200;
        let claims = Claims {
            sub: "1".to_owned(),
            role: Role::User,
            iat,
            exp: iat + 60,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(service(60).verify("not-a-jwt").is_err());
    }
}
