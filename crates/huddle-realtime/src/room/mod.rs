//! Room membership: the broadcast scope for chat and call rooms.

pub mod registry;

pub use registry::RoomRegistry;
