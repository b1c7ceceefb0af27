//! End-to-end tests: the real app on an ephemeral port, in-memory stores,
//! and WebSocket clients speaking the wire protocol.

mod helpers;
mod http_test;
mod ws_test;
