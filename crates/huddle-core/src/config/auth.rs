//! Credential verification configuration.

use serde::{Deserialize, Serialize};

/// Bearer-credential (JWT) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing and verification (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of issued tokens in minutes.
    #[serde(default = "default_ttl")]
    pub jwt_ttl_minutes: u64,
    /// Clock-skew leeway applied to `exp` checks, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Maximum number of revoked token ids remembered at once.
    #[serde(default = "default_revocation_capacity")]
    pub revocation_capacity: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_minutes: default_ttl(),
            leeway_seconds: default_leeway(),
            revocation_capacity: default_revocation_capacity(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_ttl() -> u64 {
    60
}

fn default_leeway() -> u64 {
    5
}

fn default_revocation_capacity() -> u64 {
    10_000
}
