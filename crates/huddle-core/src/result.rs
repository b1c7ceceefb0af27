//! Convenience result type alias for Huddle.

use crate::error::AppError;

/// A specialized `Result` type for Huddle operations.
pub type AppResult<T> = Result<T, AppError>;
