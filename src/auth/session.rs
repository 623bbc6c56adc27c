use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Session;

/// Clock skew tolerance when validating `exp`, in seconds.
const LEEWAY_SECONDS: u64 = 30;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account email
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at timestamp (Unix)
    pub iat: i64,
    /// Expiration timestamp (Unix)
    pub exp: i64,
}

/// A freshly issued session token together with its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and resolves HS256 session tokens. Tokens are self-contained;
/// there is no server-side revocation list, so logout is the client
/// discarding its token.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = LEEWAY_SECONDS;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issues a token for an authenticated identity.
    /// The identity claim must carry a non-empty email.
    pub fn issue(&self, session: &Session) -> Result<IssuedSession> {
        if session.email.trim().is_empty() {
            return Err(Error::BadRequest(
                "session requires a non-empty email".to_string(),
            ));
        }

        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: session.email.clone(),
            name: session.name.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Config(format!("failed to sign session token: {e}")))?;

        Ok(IssuedSession { token, expires_at })
    }

    /// Resolves a token into a session view. Pure read; calling it twice
    /// with the same token yields the same session.
    pub fn resolve(&self, token: &str) -> Result<Session> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::InvalidToken,
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(Error::InvalidToken);
        }

        Ok(Session {
            email: data.claims.sub,
            name: data.claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new(b"test-secret", Duration::hours(1))
    }

    fn session() -> Session {
        Session {
            email: "a@x.com".to_string(),
            name: Some("Mei".to_string()),
        }
    }

    #[test]
    fn test_issue_and_resolve_roundtrip() {
        let keys = keys();
        let issued = keys.issue(&session()).unwrap();
        let resolved = keys.resolve(&issued.token).unwrap();
        assert_eq!(resolved.email, "a@x.com");
        assert_eq!(resolved.name.as_deref(), Some("Mei"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let keys = keys();
        let issued = keys.issue(&session()).unwrap();
        let first = keys.resolve(&issued.token).unwrap();
        let second = keys.resolve(&issued.token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_issue_rejects_empty_email() {
        let keys = keys();
        let err = keys
            .issue(&Session {
                email: "  ".to_string(),
                name: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let keys = SessionKeys::new(b"test-secret", Duration::hours(-2));
        let issued = keys.issue(&session()).unwrap();
        let err = keys.resolve(&issued.token).unwrap_err();
        assert!(matches!(err, Error::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issued = keys().issue(&session()).unwrap();
        let other = SessionKeys::new(b"other-secret", Duration::hours(1));
        let err = other.resolve(&issued.token).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let err = keys().resolve("not.a.token").unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }
}
