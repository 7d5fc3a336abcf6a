//! HS256 access tokens and password hashing
//!
//! Tokens carry the user id in `sub` and must have an expiration.

#![allow(clippy::must_use_candidate)]

mod error;
mod password;

use chrono::Duration;
use jwt_compact::{
    AlgorithmExt, Claims, Header, TimeOptions, UntrustedToken, ValidationError,
    alg::{Hs256, Hs256Key},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub use error::TokenError;
pub use password::{PasswordError, PasswordHasher};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubjectClaims {
    sub: String,
}

/// Issues and verifies access tokens
#[derive(Clone)]
pub struct TokenVerifier {
    key: Hs256Key,
    time: TimeOptions,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: Hs256Key::new(secret.expose_secret().as_bytes()),
            time: TimeOptions::default(),
        }
    }

    /// Verify the value of an `Authorization` header and return the user id
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] when the header is absent, not a bearer
    /// token, malformed, badly signed, expired, or lacks a subject
    pub fn verify_header(&self, header: Option<&str>) -> Result<String, TokenError> {
        let header = header.ok_or(TokenError::Missing)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(TokenError::NotBearer)?;

        self.verify(token.trim())
    }

    /// Verify a raw token and return its subject
    ///
    /// # Errors
    ///
    /// See [`Self::verify_header`]
    pub fn verify(&self, raw: &str) -> Result<String, TokenError> {
        let untrusted = UntrustedToken::new(raw)?;

        let token = Hs256
            .validator::<SubjectClaims>(&self.key)
            .validate(&untrusted)
            .map_err(TokenError::Rejected)?;

        token.claims().validate_expiration(&self.time).map_err(|e| match e {
            ValidationError::Expired => TokenError::Expired,
            other => TokenError::Rejected(other),
        })?;

        let subject = token.claims().custom.sub.clone();
        if subject.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        Ok(subject)
    }

    /// Issue a token for `user_id` valid for `ttl`
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the token cannot be encoded
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims::new(SubjectClaims { sub: user_id.to_owned() }).set_duration_and_issuance(&self.time, ttl);

        let token = Hs256.token(&Header::empty(), &claims, &self.key)?;
        tracing::trace!(user_id, "access token issued");

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use rota_core::AuthFailure;

    use super::*;

    fn verifier(secret: &str) -> TokenVerifier {
        TokenVerifier::new(&SecretString::from(secret.to_owned()))
    }

    #[test]
    fn issued_token_verifies() {
        let verifier = verifier("test-secret");
        let token = verifier.issue("user-1", Duration::minutes(5)).unwrap();

        assert_eq!(verifier.verify(&token).unwrap(), "user-1");
        assert_eq!(verifier.verify_header(Some(&format!("Bearer {token}"))).unwrap(), "user-1");
    }

    #[test]
    fn missing_header() {
        let err = verifier("k").verify_header(None).unwrap_err();
        assert_eq!(err.failure(), AuthFailure::TokenMissing);
    }

    #[test]
    fn wrong_scheme_is_invalid() {
        let err = verifier("k").verify_header(Some("Basic dXNlcjpwYXNz")).unwrap_err();
        assert!(matches!(err, TokenError::NotBearer));
        assert_eq!(err.failure(), AuthFailure::TokenInvalid);
    }

    #[test]
    fn garbage_is_invalid() {
        let err = verifier("k").verify("not-a-jwt").unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
        assert_eq!(err.failure(), AuthFailure::TokenInvalid);
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let token = verifier("issuer-key").issue("user-1", Duration::minutes(5)).unwrap();
        let err = verifier("other-key").verify(&token).unwrap_err();

        assert!(matches!(err, TokenError::Rejected(_)));
        assert_eq!(err.failure(), AuthFailure::TokenInvalid);
    }

    #[test]
    fn expired_token() {
        let verifier = verifier("k");
        let token = verifier.issue("user-1", Duration::hours(-2)).unwrap();
        let err = verifier.verify(&token).unwrap_err();

        assert!(matches!(err, TokenError::Expired));
        assert_eq!(err.failure(), AuthFailure::TokenExpired);
    }
}
