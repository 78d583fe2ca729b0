//! tipcastd — the Tipcast daemon.
//!
//! Usage:
//! ```bash
//! # Point at a litecoind and go
//! TIPCAST_RPC_USER=user TIPCAST_RPC_PASS=pass \
//!     tipcastd --chain litecoin --host 127.0.0.1
//!
//! # Or give the endpoint directly
//! tipcastd --rpc-url http://127.0.0.1:9332
//! ```
//!
//! Configuration is environment-first (`TIPCAST_*`), flags override.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use tipcast_core::node::NodeRpc;
use tipcast_core::state::{MemoryStore, StateStore};
use tipcast_engine::broadcast::Broadcaster;
use tipcast_engine::poller::{ChainPoller, PollerConfig};
use tipcast_engine::registry::SubscriptionRegistry;
use tipcast_engine::store::JsonFileStore;
use tipcast_rpc::{presets, HttpClientConfig, HttpNodeClient};
use tipcast_server::{rest, ws};

struct Config {
    rpc_url: String,
    rpc_auth: Option<(String, String)>,
    ws_addr: SocketAddr,
    http_addr: SocketAddr,
    state_path: PathBuf,
    poll_interval: Duration,
    ephemeral: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("tipcastd {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}\n");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("tipcastd {}", env!("CARGO_PKG_VERSION"));
    println!("Real-time block/transaction notifier for bitcoind-family nodes\n");
    println!("USAGE:");
    println!("    tipcastd [FLAGS]\n");
    println!("FLAGS:");
    println!("    --rpc-url <URL>     Node RPC endpoint  [env: TIPCAST_RPC_URL]");
    println!("    --chain <NAME>      bitcoin | litecoin | dogecoin (with --host)");
    println!("    --host <HOST>       Node host, combined with the chain's default port");
    println!("    --ws-addr <ADDR>    WebSocket listen address  [default: 0.0.0.0:5000]");
    println!("    --http-addr <ADDR>  REST listen address       [default: 0.0.0.0:5001]");
    println!("    --state <PATH>      Resume state file  [default: ./tipcast-state.json]");
    println!("    --poll-ms <MS>      Poll interval      [default: 100]");
    println!("    --ephemeral         Keep resume state in memory only");
    println!("    --help, --version\n");
    println!("ENVIRONMENT:");
    println!("    TIPCAST_RPC_URL, TIPCAST_RPC_USER, TIPCAST_RPC_PASS,");
    println!("    TIPCAST_WS_ADDR, TIPCAST_HTTP_ADDR, TIPCAST_STATE_PATH,");
    println!("    TIPCAST_POLL_MS, RUST_LOG");
}

fn build_config(args: &[String]) -> Result<Config, String> {
    let rpc_url = match flag(args, "--rpc-url").or_else(|| env_var("TIPCAST_RPC_URL")) {
        Some(url) => url,
        None => {
            let chain = flag(args, "--chain").ok_or(
                "node endpoint required: set TIPCAST_RPC_URL, or pass --rpc-url or --chain/--host",
            )?;
            let host = flag(args, "--host").unwrap_or_else(|| "127.0.0.1".into());
            presets::url_for(&chain, &host)
        }
    };

    let rpc_auth = match (env_var("TIPCAST_RPC_USER"), env_var("TIPCAST_RPC_PASS")) {
        (Some(user), Some(pass)) => Some((user, pass)),
        _ => None,
    };

    let ws_addr = flag(args, "--ws-addr")
        .or_else(|| env_var("TIPCAST_WS_ADDR"))
        .unwrap_or_else(|| "0.0.0.0:5000".into())
        .parse()
        .map_err(|e| format!("bad WebSocket address: {e}"))?;

    let http_addr = flag(args, "--http-addr")
        .or_else(|| env_var("TIPCAST_HTTP_ADDR"))
        .unwrap_or_else(|| "0.0.0.0:5001".into())
        .parse()
        .map_err(|e| format!("bad HTTP address: {e}"))?;

    let state_path = flag(args, "--state")
        .or_else(|| env_var("TIPCAST_STATE_PATH"))
        .unwrap_or_else(|| "tipcast-state.json".into())
        .into();

    let poll_ms: u64 = flag(args, "--poll-ms")
        .or_else(|| env_var("TIPCAST_POLL_MS"))
        .unwrap_or_else(|| "100".into())
        .parse()
        .map_err(|e| format!("bad poll interval: {e}"))?;

    Ok(Config {
        rpc_url,
        rpc_auth,
        ws_addr,
        http_addr,
        state_path,
        poll_interval: Duration::from_millis(poll_ms),
        ephemeral: args.iter().any(|a| a == "--ephemeral"),
    })
}

async fn run(config: Config) -> anyhow::Result<()> {
    let client = HttpNodeClient::new(
        &config.rpc_url,
        HttpClientConfig {
            auth: config.rpc_auth.clone(),
            ..HttpClientConfig::default()
        },
    )?;
    let rpc: Arc<dyn NodeRpc> = Arc::new(client);

    let store: Arc<dyn StateStore> = if config.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(&config.state_path))
    };

    let registry = SubscriptionRegistry::new();
    let broadcaster = Broadcaster::new(registry.clone());

    // resume state resolves before the first poll
    let poller = ChainPoller::new(
        rpc.clone(),
        store,
        broadcaster,
        PollerConfig {
            poll_interval: config.poll_interval,
        },
    )
    .await;

    tracing::info!(
        rpc = %config.rpc_url,
        ws = %config.ws_addr,
        http = %config.http_addr,
        "tipcastd starting"
    );

    let ws_addr = config.ws_addr;
    let ws_registry = registry.clone();
    tokio::spawn(async move {
        if let Err(e) = ws::run(ws_addr, ws_registry).await {
            tracing::error!(error = %e, "WebSocket server exited");
        }
    });

    let http_addr = config.http_addr;
    let http_rpc = rpc.clone();
    tokio::spawn(rest::run(http_addr, http_rpc));

    tokio::spawn(poller.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}

fn flag(args: &[String], name: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == name)?;
    args.get(pos + 1).cloned()
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
