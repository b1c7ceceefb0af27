//! # huddle-auth
//!
//! The identity verifier for Huddle.
//!
//! ## Modules
//!
//! - `jwt`: HS256 token claims, issuing, verification, and the revocation blocklist

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenBlocklist, VerifiedIdentity};
