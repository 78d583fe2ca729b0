//! tipcast-rpc — HTTP JSON-RPC transport to the upstream node.
//!
//! # Features
//! - `reqwest`-backed client with basic auth and per-request timeout
//! - Typed `getblockcount` / `getblockhash` / `getblock` /
//!   `getrawtransaction` calls via the [`NodeRpc`] trait
//! - Default port presets for bitcoind-family chains
//!
//! [`NodeRpc`]: tipcast_core::node::NodeRpc

pub mod client;
pub mod presets;

pub use client::{HttpClientConfig, HttpNodeClient};
