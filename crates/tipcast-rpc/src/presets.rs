//! Default RPC ports for bitcoind-family chains.

/// `(chain, mainnet port, testnet port)` for the nodes people actually
/// point this at.
pub const CHAIN_PORTS: &[(&str, u16, u16)] = &[
    ("bitcoin", 8332, 18332),
    ("litecoin", 9332, 19332),
    ("dogecoin", 22555, 44555),
];

/// Default mainnet RPC port for a chain, if known.
pub fn default_port(chain: &str) -> Option<u16> {
    CHAIN_PORTS
        .iter()
        .find(|(name, _, _)| *name == chain)
        .map(|(_, mainnet, _)| *mainnet)
}

/// Build an RPC endpoint URL from a chain name and host.
/// Falls back to bitcoin's port for unknown chains.
pub fn url_for(chain: &str, host: &str) -> String {
    let port = default_port(chain).unwrap_or(8332);
    format!("http://{host}:{port}")
}
