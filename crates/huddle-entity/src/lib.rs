//! # huddle-entity
//!
//! Entity models for Huddle. Every struct in this crate represents a
//! database table row or the data needed to create one. Database rows
//! derive `sqlx::FromRow`.

pub mod message;
pub mod user;
