//! JWT claims structure carried by bearer credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use huddle_core::types::UserId;

/// JWT claims payload embedded in every credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the numeric user id. Tokens minted by the account service
    /// carry it as `id`.
    #[serde(alias = "id")]
    pub sub: UserId,
    /// Login name.
    pub username: String,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token id, used for revocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<Uuid>,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// The identity these claims vouch for.
    pub fn identity(&self) -> VerifiedIdentity {
        VerifiedIdentity {
            user_id: self.sub,
            username: self.username.clone(),
        }
    }
}

/// An identity that passed credential verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Numeric user id.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
}
