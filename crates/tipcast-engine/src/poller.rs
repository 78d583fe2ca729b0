//! The polling scheduler — the only active component.
//!
//! A dedicated task owns the resume state and the dedup set exclusively.
//! The timer never waits on a slow tick: `MissedTickBehavior::Skip` drops
//! overlapping fires, so polling is single-flight by construction.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use tipcast_core::chain::Block;
use tipcast_core::error::RpcError;
use tipcast_core::events::{block_event, tx_event, Topic};
use tipcast_core::node::NodeRpc;
use tipcast_core::state::{ResumeState, StateStore};

use crate::broadcast::Broadcaster;
use crate::dedup::TxDeduper;
use crate::detect::is_new_block;
use crate::enrich::TxEnricher;

/// Configuration for the poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Tick interval. Tunable; shorter just means more skipped ticks while
    /// the node is slow.
    pub poll_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Polls the node's tip and drives detection, dedup, enrichment and
/// broadcast for every new block and transaction.
pub struct ChainPoller {
    rpc: Arc<dyn NodeRpc>,
    store: Arc<dyn StateStore>,
    broadcaster: Broadcaster,
    enricher: TxEnricher,
    last_block_hash: Option<String>,
    deduper: TxDeduper,
    config: PollerConfig,
}

impl ChainPoller {
    /// Build a poller, loading the resume state first. Polling must not
    /// start before the state is resolved; a failed load falls back to an
    /// empty state (duplicates after a crash are accepted, not eliminated).
    pub async fn new(
        rpc: Arc<dyn NodeRpc>,
        store: Arc<dyn StateStore>,
        broadcaster: Broadcaster,
        config: PollerConfig,
    ) -> Self {
        let state = match store.load().await {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load resume state, starting empty");
                ResumeState::default()
            }
        };
        tracing::info!(
            last_block = state.last_block_hash.as_deref().unwrap_or("<none>"),
            broadcast_txids = state.broadcast_txids.len(),
            "resume state loaded"
        );

        Self {
            enricher: TxEnricher::new(rpc.clone()),
            rpc,
            store,
            broadcaster,
            last_block_hash: state.last_block_hash,
            deduper: TxDeduper::from_seen(state.broadcast_txids),
            config,
        }
    }

    /// Run the fixed-interval polling loop forever. A tick error aborts
    /// that tick only; the next timer fire starts fresh.
    pub async fn run(mut self) {
        let mut interval = time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                tracing::warn!(error = %e, "poll tick failed");
            }
        }
    }

    /// One poll cycle: fetch the tip, emit a block event if the hash is
    /// new, then run the transaction pipeline against the tip's tx list.
    pub async fn tick(&mut self) -> Result<(), RpcError> {
        let height = self.rpc.block_count().await?;
        let tip_hash = self.rpc.block_hash(height).await?;
        let block = self.rpc.block(&tip_hash).await?;

        let mut changed = false;

        if is_new_block(&tip_hash, self.last_block_hash.as_deref()) {
            tracing::info!(hash = %tip_hash, height = block.height, "new block");
            self.deduper.reset();
            self.last_block_hash = Some(tip_hash);
            changed = true;

            match block_event(&block) {
                Ok(event) => {
                    // the block event always precedes its transactions
                    self.broadcaster.broadcast(Topic::Blocks, &event).await;
                }
                Err(e) => tracing::warn!(error = %e, "failed to encode block event"),
            }
        }

        // The transaction pipeline runs every tick: the dedup set, not the
        // block identity, decides what subscribers have not seen yet.
        changed |= self.broadcast_new_transactions(&block).await;

        if changed {
            self.persist().await;
        }
        Ok(())
    }

    async fn broadcast_new_transactions(&mut self, block: &Block) -> bool {
        if block.tx.is_empty() {
            return false;
        }
        let new_ids = self.deduper.filter_new(&block.tx);
        if new_ids.is_empty() {
            return false;
        }

        // Independent fetches fan out concurrently, but results are joined
        // in block order before anything is dispatched.
        for (txid, result) in self.enricher.enrich_block(&new_ids).await {
            let enriched = match result {
                Ok(enriched) => enriched,
                Err(e) => {
                    tracing::warn!(txid = %txid, error = %e, "skipping transaction");
                    continue;
                }
            };
            let block_hash = enriched.block_hash.as_deref().unwrap_or(&block.hash);
            match tx_event(block_hash, &enriched.tx) {
                Ok(event) => {
                    tracing::debug!(txid = %txid, block = %block_hash, "broadcasting transaction");
                    self.broadcaster.broadcast(Topic::Transactions, &event).await;
                }
                Err(e) => tracing::warn!(txid = %txid, error = %e, "failed to encode tx event"),
            }
        }
        true
    }

    /// One durable save per tick that changed anything. A failed save is
    /// logged; the in-memory state stays authoritative for this process.
    async fn persist(&self) {
        let state = ResumeState {
            last_block_hash: self.last_block_hash.clone(),
            broadcast_txids: self.deduper.seen().clone(),
        };
        if let Err(e) = self.store.save(&state).await {
            tracing::warn!(error = %e, "failed to persist resume state");
        }
    }

    #[cfg(test)]
    pub(crate) fn last_block_hash(&self) -> Option<&str> {
        self.last_block_hash.as_deref()
    }
}
