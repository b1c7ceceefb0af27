//! WebSocket authentication: validates the credential presented at connect.

use std::sync::Arc;

use tracing::warn;

use huddle_auth::{JwtDecoder, VerifiedIdentity};
use huddle_core::error::AppError;

/// Authenticates WebSocket connections using JWT tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a connection attempt.
    ///
    /// Called once per connection before anything is registered; the
    /// resulting identity is fixed for the connection's lifetime.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<VerifiedIdentity, AppError> {
        let token = token.unwrap_or_default();
        match self.decoder.verify(token).await {
            Ok(identity) => Ok(identity),
            Err(e) => {
                warn!(reason = %e.message, "WebSocket connection refused");
                Err(e)
            }
        }
    }
}
