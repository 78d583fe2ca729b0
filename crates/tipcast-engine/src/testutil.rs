//! Shared test doubles: a scriptable node and a recording sink.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Map;

use tipcast_core::chain::{Block, RawTransaction, ScriptPubKey, TxInput, TxOutput};
use tipcast_core::error::{RpcError, SinkError, StateError};
use tipcast_core::node::NodeRpc;
use tipcast_core::state::{ResumeState, StateStore};

use crate::registry::{EventSink, SinkId};

/// In-memory `NodeRpc` with a settable tip and transaction table.
#[derive(Default)]
pub struct MockNode {
    tip: Mutex<Option<(u64, String)>>,
    blocks: Mutex<HashMap<String, Block>>,
    txs: Mutex<HashMap<String, RawTransaction>>,
    call_delay: Mutex<Duration>,
    polls: AtomicUsize,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the tip at `hash` and register the block with those tx ids.
    pub fn set_tip(&self, height: u64, hash: &str, txids: &[&str]) {
        *self.tip.lock().unwrap() = Some((height, hash.to_string()));
        self.blocks
            .lock()
            .unwrap()
            .insert(hash.to_string(), block(hash, height, txids));
    }

    pub fn add_tx(&self, tx: RawTransaction) {
        self.txs.lock().unwrap().insert(tx.txid.clone(), tx);
    }

    /// Delay applied to `block_count`, for scheduler timing tests.
    pub fn set_call_delay(&self, delay: Duration) {
        *self.call_delay.lock().unwrap() = delay;
    }

    /// How many poll cycles reached the node.
    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn block_count(&self) -> Result<u64, RpcError> {
        self.polls.fetch_add(1, Ordering::Relaxed);
        let delay = *self.call_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.tip
            .lock()
            .unwrap()
            .as_ref()
            .map(|(height, _)| *height)
            .ok_or_else(|| RpcError::Other("no tip configured".into()))
    }

    async fn block_hash(&self, height: u64) -> Result<String, RpcError> {
        let tip = self.tip.lock().unwrap();
        match tip.as_ref() {
            Some((h, hash)) if *h == height => Ok(hash.clone()),
            _ => Err(RpcError::Other(format!("no block at height {height}"))),
        }
    }

    async fn block(&self, hash: &str) -> Result<Block, RpcError> {
        self.blocks
            .lock()
            .unwrap()
            .get(hash)
            .cloned()
            .ok_or_else(|| RpcError::Other(format!("unknown block {hash}")))
    }

    async fn raw_transaction(&self, txid: &str) -> Result<RawTransaction, RpcError> {
        self.txs
            .lock()
            .unwrap()
            .get(txid)
            .cloned()
            .ok_or_else(|| RpcError::Other(format!("unknown transaction {txid}")))
    }
}

fn denied() -> StateError {
    StateError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "store unavailable",
    ))
}

/// Store whose saves always fail; loads yield the default state.
/// Counts save attempts so tests can assert the poller kept trying.
#[derive(Default)]
pub struct SaveFailStore {
    saves: AtomicUsize,
}

impl SaveFailStore {
    pub fn save_attempts(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StateStore for SaveFailStore {
    async fn load(&self) -> Result<ResumeState, StateError> {
        Ok(ResumeState::default())
    }

    async fn save(&self, _state: &ResumeState) -> Result<(), StateError> {
        self.saves.fetch_add(1, Ordering::Relaxed);
        Err(denied())
    }
}

/// Store whose loads always fail.
pub struct LoadFailStore;

#[async_trait]
impl StateStore for LoadFailStore {
    async fn load(&self) -> Result<ResumeState, StateError> {
        Err(denied())
    }

    async fn save(&self, _state: &ResumeState) -> Result<(), StateError> {
        Ok(())
    }
}

/// Sink that records every payload; optionally fails every delivery.
pub struct RecordingSink {
    id: SinkId,
    received: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSink {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            id: SinkId::next(),
            received: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Self {
        Self {
            id: SinkId::next(),
            received: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    fn id(&self) -> SinkId {
        self.id
    }

    async fn deliver(&self, payload: &str) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError("connection closed".into()));
        }
        self.received.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

pub fn block(hash: &str, height: u64, txids: &[&str]) -> Block {
    Block {
        hash: hash.to_string(),
        height,
        time: 1_700_000_000,
        tx: txids.iter().map(|s| s.to_string()).collect(),
        previousblockhash: None,
        extra: Map::new(),
    }
}

pub fn raw_tx(
    txid: &str,
    blockhash: Option<&str>,
    vin: Vec<TxInput>,
    vout: Vec<TxOutput>,
) -> RawTransaction {
    RawTransaction {
        txid: txid.to_string(),
        version: 1,
        time: Some(1_700_000_000),
        locktime: 0,
        blockhash: blockhash.map(|s| s.to_string()),
        vin,
        vout,
        extra: Map::new(),
    }
}

pub fn coinbase_input() -> TxInput {
    TxInput {
        txid: None,
        vout: None,
        coinbase: Some("04ffff001d".into()),
        extra: Map::new(),
    }
}

pub fn spend_input(txid: &str, vout: u32) -> TxInput {
    TxInput {
        txid: Some(txid.to_string()),
        vout: Some(vout),
        coinbase: None,
        extra: Map::new(),
    }
}

pub fn output(n: u32, value: f64, addr: Option<&str>, script_type: &str) -> TxOutput {
    TxOutput {
        value,
        n,
        script_pub_key: ScriptPubKey {
            addresses: addr.map(|a| vec![a.to_string()]),
            script_type: script_type.to_string(),
            extra: Map::new(),
        },
    }
}
