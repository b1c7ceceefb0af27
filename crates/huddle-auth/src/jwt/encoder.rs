//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use huddle_core::config::AuthConfig;
use huddle_core::error::AppError;
use huddle_core::types::UserId;

use super::claims::Claims;

/// Creates signed bearer credentials.
///
/// Production credentials are issued by the account service; this encoder
/// shares its secret and is used by the admin CLI and tests.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in minutes.
    ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// A freshly signed credential.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Token id (for revocation).
    pub jti: Uuid,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: i64::try_from(config.jwt_ttl_minutes).unwrap_or(i64::MAX / 60),
        }
    }

    /// Issues a credential for the given user.
    pub fn issue(&self, user_id: UserId, username: &str) -> Result<IssuedToken, AppError> {
        self.issue_with_ttl(user_id, username, chrono::Duration::minutes(self.ttl_minutes))
    }

    /// Issues a credential with an explicit lifetime (negative for already-expired tokens).
    pub fn issue_with_ttl(
        &self,
        user_id: UserId,
        username: &str,
        ttl: chrono::Duration,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let exp = now + ttl;
        let jti = Uuid::new_v4();

        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Some(jti),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at: exp,
        })
    }
}
