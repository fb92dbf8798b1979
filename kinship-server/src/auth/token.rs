use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only algorithm tokens are signed and accepted with
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Payload carried inside an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated user
    pub sub: String,
    /// Expiry as seconds since the Unix epoch
    pub exp: i64,
}

/// Why a token was refused. None of these are I/O failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token has no subject")]
    MissingSubject,
}

/// Issues and verifies HS256 access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// How long freshly issued tokens stay valid
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `username` expiring after the configured lifetime
    pub fn issue(&self, username: &str) -> anyhow::Result<String> {
        self.issue_with_expiry(username, Utc::now() + self.lifetime)
    }

    /// Issue a token for `username` with an explicit expiry
    pub fn issue_with_expiry(
        &self,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<String> {
        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        // `exp` is truncated to whole seconds; its final second counts as expired
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        if data.claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        Ok(data.claims)
    }
}
