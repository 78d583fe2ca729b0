//! The `NodeRpc` trait — the upstream node as the engine sees it.

use async_trait::async_trait;

use crate::chain::{Block, RawTransaction};
use crate::error::RpcError;

/// The four node calls the notifier needs.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn NodeRpc>`.
#[async_trait]
pub trait NodeRpc: Send + Sync + 'static {
    /// Height of the node's current best block (`getblockcount`).
    async fn block_count(&self) -> Result<u64, RpcError>;

    /// Block hash at a height (`getblockhash`).
    async fn block_hash(&self, height: u64) -> Result<String, RpcError>;

    /// Block by hash (`getblock`).
    async fn block(&self, hash: &str) -> Result<Block, RpcError>;

    /// Verbose transaction by id (`getrawtransaction`).
    async fn raw_transaction(&self, txid: &str) -> Result<RawTransaction, RpcError>;
}
