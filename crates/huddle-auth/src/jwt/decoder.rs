//! JWT token validation and blocklist checking.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use huddle_core::config::AuthConfig;
use huddle_core::error::AppError;

use super::blocklist::TokenBlocklist;
use super::claims::{Claims, VerifiedIdentity};

/// Validates bearer credentials and checks revocation status.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Revoked token ids.
    blocklist: TokenBlocklist,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let retention = Duration::from_secs(
            config
                .jwt_ttl_minutes
                .saturating_mul(60)
                .saturating_add(config.leeway_seconds),
        );
        Self::with_blocklist(
            config,
            TokenBlocklist::new(config.revocation_capacity, retention),
        )
    }

    /// Creates a decoder sharing an existing blocklist.
    pub fn with_blocklist(config: &AuthConfig, blocklist: TokenBlocklist) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            blocklist,
        }
    }

    /// The revocation blocklist consulted by this decoder.
    pub fn blocklist(&self) -> &TokenBlocklist {
        &self.blocklist
    }

    /// Verifies a credential and returns the identity it vouches for.
    ///
    /// Checks:
    /// 1. Presence
    /// 2. Signature validity
    /// 3. Expiration
    /// 4. Token id not revoked
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AppError> {
        let claims = self.decode_claims(token).await?;
        Ok(claims.identity())
    }

    /// Same as [`JwtDecoder::verify`] but returns the full claims.
    pub async fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::authentication("Missing credential"));
        }

        let claims = self.decode_token(token)?;

        if claims.username.trim().is_empty() {
            return Err(AppError::authentication("Credential carries no username"));
        }

        if let Some(jti) = claims.jti {
            if self.blocklist.is_revoked(&jti).await {
                return Err(AppError::authentication("Token has been revoked"));
            }
        }

        Ok(claims)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            leeway_seconds: 0,
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let config = config();
        let token = JwtEncoder::new(&config).issue(42, "alice").unwrap();
        let identity = JwtDecoder::new(&config).verify(&token.token).await.unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let err = JwtDecoder::new(&config()).verify("  ").await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = JwtEncoder::new(&config()).issue(1, "alice").unwrap();
        let other = AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..config()
        };
        let err = JwtDecoder::new(&other).verify(&token.token).await.unwrap_err();
        assert!(err.is_authentication());
        assert!(err.message.contains("signature"));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let token = JwtEncoder::new(&config())
            .issue_with_ttl(1, "alice", chrono::Duration::minutes(-5))
            .unwrap();
        let err = JwtDecoder::new(&config()).verify(&token.token).await.unwrap_err();
        assert_eq!(err.message, "Token has expired");
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let config = config();
        let decoder = JwtDecoder::new(&config);
        let token = JwtEncoder::new(&config).issue(1, "alice").unwrap();

        decoder.blocklist().revoke(token.jti).await;

        let err = decoder.verify(&token.token).await.unwrap_err();
        assert_eq!(err.message, "Token has been revoked");
    }

    #[tokio::test]
    async fn test_account_service_id_claim_accepted() {
        let config = config();
        let claims = serde_json::json!({
            "id": 9,
            "username": "carol",
            "exp": chrono::Utc::now().timestamp() + 600,
        });
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        let identity = JwtDecoder::new(&config).verify(&token).await.unwrap();
        assert_eq!(identity.user_id, 9);
    }
}
