//! Error taxonomy shared across the workspace.
//!
//! Nothing here is process-fatal: RPC errors are scoped to a tick or a
//! single transaction, sink errors to one subscriber, state errors to one
//! save/load attempt.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors talking to the upstream node.
#[derive(Debug, Error)]
pub enum RpcError {
    /// HTTP request failed (connection refused, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Response could not be deserialized into the expected shape.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

/// Errors loading or saving durable resume state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State (de)serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A single subscriber's delivery failed. Scoped to that sink only.
#[derive(Debug, Error)]
#[error("Sink delivery failed: {0}")]
pub struct SinkError(pub String);
