//! Development token commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use huddle_auth::{JwtDecoder, JwtEncoder};
use huddle_core::config::AppConfig;
use huddle_core::error::AppError;
use huddle_database::UserRepository;

use crate::output::{self, OutputFormat};

/// Arguments for issue-token
#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// Username the token identifies
    #[arg(short, long)]
    pub username: String,

    /// Numeric user id (looked up in the users table when omitted)
    #[arg(long)]
    pub user_id: Option<i64>,

    /// Lifetime in minutes (defaults to auth.jwt_ttl_minutes)
    #[arg(long)]
    pub ttl_minutes: Option<i64>,
}

/// Arguments for verify-token
#[derive(Debug, Args)]
pub struct VerifyTokenArgs {
    /// The compact JWT
    pub token: String,
}

/// A token and what it vouches for.
#[derive(Debug, Serialize, Tabled)]
struct TokenRow {
    #[tabled(rename = "User ID")]
    user_id: i64,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Expires")]
    expires_at: String,
    #[tabled(rename = "Token ID")]
    jti: String,
    #[tabled(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Issue a signed token
pub async fn issue(
    args: &IssueTokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let user_id = match args.user_id {
        Some(id) => id,
        None => {
            let db = super::connect_db(config).await?;
            UserRepository::new(db.into_pool())
                .find_by_username(&args.username)
                .await?
                .map(|u| u.id)
                .ok_or_else(|| AppError::not_found(format!("No user named '{}'", args.username)))?
        }
    };

    let encoder = JwtEncoder::new(&config.auth);
    let issued = match args.ttl_minutes {
        Some(minutes) => encoder.issue_with_ttl(
            user_id,
            &args.username,
            chrono::Duration::minutes(minutes),
        )?,
        None => encoder.issue(user_id, &args.username)?,
    };

    if format == OutputFormat::Table {
        println!("{}", issued.token);
    }
    output::print_record(
        &TokenRow {
            user_id,
            username: args.username.clone(),
            expires_at: issued.expires_at.to_rfc3339(),
            jti: issued.jti.to_string(),
            token: Some(issued.token.clone()),
        },
        format,
    );
    Ok(())
}

/// Verify a token against the configured secret
pub async fn verify(
    args: &VerifyTokenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let claims = JwtDecoder::new(&config.auth)
        .decode_claims(args.token.trim())
        .await?;

    output::print_record(
        &TokenRow {
            user_id: claims.user_id(),
            username: claims.username.clone(),
            expires_at: claims.expires_at().to_rfc3339(),
            jti: claims.jti.map(|j| j.to_string()).unwrap_or_default(),
            token: None,
        },
        format,
    );
    output::print_success("Token is valid");
    Ok(())
}
