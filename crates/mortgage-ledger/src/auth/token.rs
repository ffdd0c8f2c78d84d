use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of an issued bearer token.
pub const TOKEN_VALIDITY_HOURS: i64 = 2;

/// Claim set carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Expiry as a UTC unix timestamp.
    pub exp: i64,
}

/// Issues and checks HS256-signed tokens. Holds no per-session state, so a token
/// stays valid until `exp` regardless of logout.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity: Duration::hours(TOKEN_VALIDITY_HOURS),
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        self.issue_at(username, Utc::now())
    }

    /// Issues a token as if it were signed at `issued_at`.
    pub fn issue_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            username: username.to_string(),
            exp: (issued_at + self.validity).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Returns the username embedded in a valid token.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.username)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("validity_hours", &self.validity.num_hours())
            .finish()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// A missing header or any other shape is reported as [`TokenError::Malformed`].
pub fn bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let value = header.ok_or(TokenError::Malformed)?.trim();
    let (scheme, token) = value.split_once(' ').ok_or(TokenError::Malformed)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(TokenError::Malformed);
    }
    Ok(token)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates_to_username() {
        let service = TokenService::new("test-secret");
        let token = service.issue("alice").expect("token issued");

        assert_eq!(service.validate(&token), Ok("alice".to_string()));
    }

    #[test]
    fn token_expires_after_validity_window() {
        let service = TokenService::new("test-secret");
        let issued_at = Utc::now() - Duration::hours(TOKEN_VALIDITY_HOURS) - Duration::minutes(1);
        let token = service.issue_at("alice", issued_at).expect("token issued");

        assert_eq!(service.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_is_still_valid_just_inside_window() {
        let service = TokenService::new("test-secret");
        let issued_at = Utc::now() - Duration::hours(TOKEN_VALIDITY_HOURS) + Duration::minutes(1);
        let token = service.issue_at("alice", issued_at).expect("token issued");

        assert!(service.validate(&token).is_ok());
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let issuer = TokenService::new("another-secret");
        let verifier = TokenService::new("test-secret");
        let token = issuer.issue("alice").expect("token issued");

        assert_eq!(verifier.validate(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn garbage_is_rejected() {
        let service = TokenService::new("test-secret");

        assert_eq!(service.validate("not.a.jwt"), Err(TokenError::Malformed));
        assert_eq!(service.validate(""), Err(TokenError::Malformed));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(Some("bearer abc.def")), Ok("abc.def"));
        assert_eq!(bearer_token(None), Err(TokenError::Malformed));
        assert_eq!(bearer_token(Some("abc.def")), Err(TokenError::Malformed));
        assert_eq!(bearer_token(Some("Basic abc.def")), Err(TokenError::Malformed));
        assert_eq!(bearer_token(Some("Bearer ")), Err(TokenError::Malformed));
    }

    #[test]
    fn debug_output_hides_secret() {
        let service = TokenService::new("very-private");
        assert!(!format!("{service:?}").contains("very-private"));
    }
}
