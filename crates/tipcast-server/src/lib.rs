//! tipcast-server — the outward-facing surfaces.
//!
//! # Features
//! - WebSocket push transport: subscribers connect, send
//!   `{"op":"tx_sub"}` / `{"op":"blocks_sub"}`, and receive serialized
//!   block/transaction events
//! - Read-only REST passthrough over the node RPC (pure 1:1 proxy)

pub mod rest;
pub mod ws;

pub use ws::WsSink;
