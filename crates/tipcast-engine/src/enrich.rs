//! Transaction enrichment — resolving inputs to the outputs they spend.
//!
//! Cost per transaction is `1 + number of non-generation inputs` node
//! calls; scanning the previous transaction's outputs for the referenced
//! index is local.

use std::sync::Arc;

use futures::future;
use thiserror::Error;

use tipcast_core::chain::TxOutput;
use tipcast_core::error::RpcError;
use tipcast_core::events::{EnrichedTransaction, ResolvedInput, ResolvedOutput};
use tipcast_core::node::NodeRpc;

/// Why a single transaction could not be enriched. Always scoped to that
/// transaction — the rest of the block proceeds.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("upstream unavailable: {0}")]
    Upstream(RpcError),

    #[error("malformed upstream data: {0}")]
    Malformed(String),
}

impl From<RpcError> for EnrichError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Deserialization(inner) => Self::Malformed(inner.to_string()),
            other => Self::Upstream(other),
        }
    }
}

/// An enriched transaction plus the block hash the node reports for it.
#[derive(Debug, Clone)]
pub struct Enriched {
    pub block_hash: Option<String>,
    pub tx: EnrichedTransaction,
}

/// Resolves transactions via the upstream node.
#[derive(Clone)]
pub struct TxEnricher {
    rpc: Arc<dyn NodeRpc>,
}

impl TxEnricher {
    pub fn new(rpc: Arc<dyn NodeRpc>) -> Self {
        Self { rpc }
    }

    /// Fetch a transaction and resolve all of its outputs and inputs.
    ///
    /// Generation inputs (no previous-transaction reference) contribute no
    /// entry to `inputs`. A referenced output index missing from the
    /// previous transaction is malformed upstream data.
    pub async fn enrich(&self, txid: &str) -> Result<Enriched, EnrichError> {
        let raw = self.rpc.raw_transaction(txid).await?;

        let out: Vec<ResolvedOutput> = raw.vout.iter().map(resolve_output).collect();

        let mut inputs = Vec::new();
        for vin in &raw.vin {
            let Some((prev_txid, index)) = vin.previous_output() else {
                continue;
            };
            let prev = self.rpc.raw_transaction(prev_txid).await?;
            let spent = prev
                .vout
                .iter()
                .find(|o| o.n == index)
                .ok_or_else(|| {
                    EnrichError::Malformed(format!(
                        "transaction {prev_txid} has no output index {index}"
                    ))
                })?;
            inputs.push(ResolvedInput {
                prev_out: resolve_output(spent),
            });
        }

        Ok(Enriched {
            block_hash: raw.blockhash.clone(),
            tx: EnrichedTransaction {
                hash: raw.txid,
                ver: raw.version,
                time: raw.time,
                lock_time: raw.locktime,
                vin_sz: raw.vin.len(),
                vout_sz: raw.vout.len(),
                inputs,
                out,
            },
        })
    }

    /// Enrich a block's worth of transactions concurrently. Results come
    /// back in the order of `txids`; per-transaction failures are kept so
    /// the caller can skip and report them individually.
    pub async fn enrich_block(
        &self,
        txids: &[String],
    ) -> Vec<(String, Result<Enriched, EnrichError>)> {
        let results = future::join_all(txids.iter().map(|id| self.enrich(id))).await;
        txids.iter().cloned().zip(results).collect()
    }
}

fn resolve_output(out: &TxOutput) -> ResolvedOutput {
    ResolvedOutput {
        value: out.value,
        addr: out.script_pub_key.primary_address(),
        script_type: out.script_pub_key.script_type.clone(),
    }
}
