//! # huddle-core
//!
//! Core crate for Huddle. Contains the configuration schema, typed
//! identifiers, the boundary traits the real-time core consumes from the
//! persistence layer, and the unified error system.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
