//! Room and direct chat relay with fire-and-forget persistence.

pub mod persistence;
pub mod relay;

pub use persistence::PersistenceSink;
pub use relay::MessageRelay;
