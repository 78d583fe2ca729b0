//! Read-only REST passthrough.
//!
//! A 1:1 proxy over the node's own shapes — no dedup, no enrichment.
//! Unknown operations and bad parameters come back as structured
//! `{"error": ...}` payloads, never as a raised error.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use warp::Filter;

use tipcast_core::error::RpcError;
use tipcast_core::node::NodeRpc;

enum PassthroughError {
    UnknownCommand,
    InvalidParameters,
}

impl From<RpcError> for PassthroughError {
    fn from(_: RpcError) -> Self {
        Self::InvalidParameters
    }
}

impl From<serde_json::Error> for PassthroughError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidParameters
    }
}

/// Resolve one passthrough operation to the node's raw JSON.
async fn handle_op(
    rpc: &Arc<dyn NodeRpc>,
    op: &str,
    id: Option<&str>,
) -> Result<Value, PassthroughError> {
    match op {
        "block" => {
            let id = id.ok_or(PassthroughError::InvalidParameters)?;
            // an integer parameter is a height, anything else a hash
            let hash = match id.parse::<u64>() {
                Ok(height) => rpc.block_hash(height).await?,
                Err(_) => id.to_string(),
            };
            Ok(serde_json::to_value(rpc.block(&hash).await?)?)
        }
        "tx" => {
            let id = id.ok_or(PassthroughError::InvalidParameters)?;
            Ok(serde_json::to_value(rpc.raw_transaction(id).await?)?)
        }
        "latestblock" => {
            let height = rpc.block_count().await?;
            let hash = rpc.block_hash(height).await?;
            Ok(serde_json::to_value(rpc.block(&hash).await?)?)
        }
        "latesttx" => {
            let height = rpc.block_count().await?;
            let hash = rpc.block_hash(height).await?;
            let block = rpc.block(&hash).await?;
            let txid = block
                .tx
                .last()
                .ok_or(PassthroughError::InvalidParameters)?;
            Ok(serde_json::to_value(rpc.raw_transaction(txid).await?)?)
        }
        _ => Err(PassthroughError::UnknownCommand),
    }
}

async fn dispatch(rpc: Arc<dyn NodeRpc>, op: String, id: Option<String>) -> Value {
    match handle_op(&rpc, &op, id.as_deref()).await {
        Ok(value) => value,
        Err(PassthroughError::UnknownCommand) => json!({ "error": "Unknown Command" }),
        Err(PassthroughError::InvalidParameters) => json!({ "error": "Invalid Parameters" }),
    }
}

/// Build the passthrough routes.
pub fn routes(
    rpc: Arc<dyn NodeRpc>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_rpc = warp::any().map(move || rpc.clone());

    // uptime monitors poll this exact string
    let alive = warp::path!("areyoualive").and(warp::get()).map(|| "yes");

    let op_with_id = warp::path!(String / String)
        .and(warp::get())
        .and(with_rpc.clone())
        .then(|op: String, id: String, rpc: Arc<dyn NodeRpc>| async move {
            warp::reply::json(&dispatch(rpc, op, Some(id)).await)
        });

    let op_only = warp::path!(String)
        .and(warp::get())
        .and(with_rpc)
        .then(|op: String, rpc: Arc<dyn NodeRpc>| async move {
            warp::reply::json(&dispatch(rpc, op, None).await)
        });

    let fallback = warp::get().map(|| warp::reply::json(&json!({ "error": "Unknown Command" })));

    alive
        .or(op_with_id)
        .or(op_only)
        .or(fallback)
        .with(warp::reply::with::header(
            "Access-Control-Allow-Origin",
            "*",
        ))
}

/// Serve the passthrough surface.
pub async fn run(addr: SocketAddr, rpc: Arc<dyn NodeRpc>) {
    tracing::info!(%addr, "REST passthrough listening");
    warp::serve(routes(rpc)).run(addr).await;
}
