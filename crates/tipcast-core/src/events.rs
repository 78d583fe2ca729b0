//! Outgoing push payload shapes.
//!
//! The wire format is the one long-lived subscribers already parse:
//! `{"op":"block","x":{...}}` for new blocks and
//! `{"op":"utx","block_hash":...,"x":{...}}` for newly seen transactions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::Block;

/// The two independent event classes subscribers can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Blocks,
    Transactions,
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocks => write!(f, "blocks"),
            Self::Transactions => write!(f, "transactions"),
        }
    }
}

/// A resolved output: value, first address (empty when none), script type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOutput {
    pub value: f64,
    pub addr: String,
    #[serde(rename = "type")]
    pub script_type: String,
}

/// A resolved input — the previous output it spends.
/// Generation inputs never produce one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedInput {
    pub prev_out: ResolvedOutput,
}

/// A transaction with its inputs and outputs fully resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    pub hash: String,
    pub ver: i64,
    /// Omitted from the payload when the node does not report it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    pub lock_time: u64,
    pub vin_sz: usize,
    pub vout_sz: usize,
    pub inputs: Vec<ResolvedInput>,
    pub out: Vec<ResolvedOutput>,
}

/// Build the block event payload: the node's block JSON with an added
/// `nTx` transaction count, wrapped in the push envelope.
pub fn block_event(block: &Block) -> Result<Value, serde_json::Error> {
    let mut x = serde_json::to_value(block)?;
    x["nTx"] = block.tx.len().into();
    Ok(serde_json::json!({ "op": "block", "x": x }))
}

/// Build the transaction event payload.
pub fn tx_event(block_hash: &str, tx: &EnrichedTransaction) -> Result<Value, serde_json::Error> {
    Ok(serde_json::json!({
        "op": "utx",
        "block_hash": block_hash,
        "x": serde_json::to_value(tx)?,
    }))
}
