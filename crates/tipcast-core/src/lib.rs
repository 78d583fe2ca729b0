//! tipcast-core — shared types and traits for Tipcast.
//!
//! # Overview
//!
//! Tipcast is a real-time notifier in front of a bitcoind-family node:
//! it polls for new blocks, resolves each newly confirmed transaction's
//! inputs and outputs, and pushes block/transaction events to WebSocket
//! subscribers. The core crate defines:
//!
//! - [`NodeRpc`] — the upstream node as an async trait
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types
//! - [`chain`] module — block/transaction shapes the node returns
//! - [`events`] module — outgoing push payload shapes and [`Topic`]
//! - [`ResumeState`] / [`StateStore`] — durable restart state
//! - [`error`] module — the workspace error taxonomy

pub mod chain;
pub mod error;
pub mod events;
pub mod node;
pub mod request;
pub mod state;

pub use chain::{Block, RawTransaction, ScriptPubKey, TxInput, TxOutput};
pub use error::{RpcError, SinkError, StateError};
pub use events::{EnrichedTransaction, ResolvedInput, ResolvedOutput, Topic};
pub use node::NodeRpc;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use state::{MemoryStore, ResumeState, StateStore};
