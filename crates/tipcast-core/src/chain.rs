//! Chain data model — the shapes the node returns over JSON-RPC.
//!
//! Only the fields the engine actually inspects are typed; everything else
//! a node attaches to a block is kept in the flattened `extra` map so the
//! outgoing block event stays lossless.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A block as returned by `getblock` (verbosity 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub height: u64,
    pub time: u64,
    /// Transaction ids, in block order.
    pub tx: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previousblockhash: Option<String>,
    /// Node-supplied metadata we pass through untouched
    /// (confirmations, size, merkleroot, difficulty, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A transaction as returned by `getrawtransaction` with verbose output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: String,
    pub version: i64,
    /// Absent for transactions not yet in a block on some nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    pub locktime: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<String>,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One transaction input. Generation (coinbase) inputs carry `coinbase`
/// and no `txid`/`vout` reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TxInput {
    /// The `(txid, index)` of the output this input spends, if any.
    pub fn previous_output(&self) -> Option<(&str, u32)> {
        match (self.txid.as_deref(), self.vout) {
            (Some(txid), Some(n)) if !txid.is_empty() => Some((txid, n)),
            _ => None,
        }
    }
}

/// One transaction output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: f64,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

/// The output script summary the node attaches to each `vout` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptPubKey {
    /// Absent for unspendable outputs (e.g. OP_RETURN).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub script_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScriptPubKey {
    /// First address of the output, or the empty string when the script
    /// has none. Multi-address outputs report only the first.
    pub fn primary_address(&self) -> String {
        self.addresses
            .as_ref()
            .and_then(|a| a.first())
            .cloned()
            .unwrap_or_default()
    }
}
