//! Call signaling: call initiation and offer/answer/ICE forwarding.

pub mod relay;

pub use relay::SignalingRelay;
