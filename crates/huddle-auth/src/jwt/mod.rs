//! JWT token encoding, decoding, and revocation.

pub mod blocklist;
pub mod claims;
pub mod decoder;
pub mod encoder;

pub use blocklist::TokenBlocklist;
pub use claims::{Claims, VerifiedIdentity};
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
