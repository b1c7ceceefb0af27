//! Presence registry: live connections, per-username routes, and the
//! deduplicated online-user view.

pub mod registry;
pub mod view;

pub use registry::{PresenceRegistry, Session};
pub use view::PresenceEntry;
