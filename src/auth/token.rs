//! HS256 session tokens.
//!
//! Signing and verification go through `jsonwebtoken`. Only `HS256` is
//! accepted; a token signed with any other algorithm is treated as malformed.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::AuthConfig;
use crate::domain::UserId;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// Parses the subject as a user id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedToken` if the subject is not a UUID.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        UserId::parse(&self.sub).map_err(|_| AuthError::MalformedToken)
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service from validated configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            lifetime: Duration::try_days(config.expire_days).unwrap_or(Duration::MAX),
        }
    }

    /// Issues a token for the user, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the expiry is out of range or signing
    /// fails.
    pub fn issue(&self, user: &UserId) -> Result<String, AuthError> {
        self.issue_at(user, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// See [`TokenService::issue`].
    pub fn issue_at(&self, user: &UserId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Internal("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| AuthError::Internal(error.to_string()))
    }

    /// Verifies a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns the matching `AuthError` when the token is malformed, forged
    /// or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(rejection)
    }
}

fn rejection(error: JwtError) -> AuthError {
    match error.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const SECRET: &str = "test-secret-of-sufficient-length";

    #[fixture]
    fn service() -> TokenService {
        TokenService::new(&AuthConfig::new(SECRET, 30).unwrap())
    }

    fn sign(header: &Header, claims: &Claims) -> String {
        jsonwebtoken::encode(header, claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn fresh_claims(user: &UserId) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        }
    }

    #[rstest]
    fn test_issue_then_verify(service: TokenService) {
        let user = UserId::generate();
        let token = service.issue(&user).unwrap();

        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[rstest]
    fn test_token_has_three_segments(service: TokenService) {
        let token = service.issue(&UserId::generate()).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[rstest]
    fn test_expired_token_is_rejected(service: TokenService) {
        let issued = Utc::now() - Duration::days(31);
        let token = service.issue_at(&UserId::generate(), issued).unwrap();

        assert_eq!(service.verify(&token), Err(AuthError::Expired));
    }

    #[rstest]
    fn test_token_from_other_secret_is_rejected(service: TokenService) {
        let other =
            TokenService::new(&AuthConfig::new("another-secret-of-enough-length", 30).unwrap());
        let token = other.issue(&UserId::generate()).unwrap();

        assert_eq!(service.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[rstest]
    fn test_tampered_payload_is_rejected(service: TokenService) {
        let token = service.issue(&UserId::generate()).unwrap();
        let other = service.issue(&UserId::generate()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let foreign_payload = other.split('.').nth(1).unwrap();

        let forged = format!("{}.{}.{}", parts[0], foreign_payload, parts[2]);

        assert_eq!(service.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("a.b")]
    #[case("a.b.c.d")]
    #[case("!!!.???.***")]
    fn test_malformed_tokens(service: TokenService, #[case] token: &str) {
        assert_eq!(service.verify(token), Err(AuthError::MalformedToken));
    }

    #[rstest]
    fn test_other_algorithm_is_rejected(service: TokenService) {
        let token = sign(
            &Header::new(Algorithm::HS512),
            &fresh_claims(&UserId::generate()),
        );

        assert_eq!(service.verify(&token), Err(AuthError::MalformedToken));
    }

    #[rstest]
    fn test_header_without_type_is_accepted(service: TokenService) {
        let user = UserId::generate();
        let mut header = Header::new(Algorithm::HS256);
        header.typ = None;
        let token = sign(&header, &fresh_claims(&user));

        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user);
    }

    #[rstest]
    fn test_non_uuid_subject_is_malformed(service: TokenService) {
        let mut claims = fresh_claims(&UserId::generate());
        claims.sub = "not-a-user".to_string();
        let token = sign(&Header::new(Algorithm::HS256), &claims);

        let verified = service.verify(&token).unwrap();

        assert_eq!(verified.user_id(), Err(AuthError::MalformedToken));
    }

    #[rstest]
    fn test_unrepresentable_expiry_is_an_internal_error() {
        let service = TokenService::new(&AuthConfig {
            secret: SECRET.as_bytes().to_vec(),
            expire_days: i64::MAX,
        });

        assert!(matches!(
            service.issue(&UserId::generate()),
            Err(AuthError::Internal(_))
        ));
    }
}
