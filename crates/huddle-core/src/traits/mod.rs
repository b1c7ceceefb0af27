//! Boundary traits defined in `huddle-core` and implemented by the
//! persistence crate.

pub mod message_store;
pub mod user_directory;

pub use message_store::MessageStore;
pub use user_directory::UserDirectory;
