//! tipcast-engine — the detection-and-fan-out core.
//!
//! # Overview
//!
//! One dedicated task ([`ChainPoller`]) polls the node tip on a fixed
//! interval and drives everything else:
//!
//! ```text
//! tip hash → is_new_block → TxDeduper → TxEnricher → Broadcaster → sinks
//! ```
//!
//! - [`SubscriptionRegistry`] — per-topic sink sets, concurrency-safe
//! - [`Broadcaster`] — serialize once, deliver with per-sink isolation
//! - [`TxEnricher`] — resolve inputs/outputs via the node
//! - [`TxDeduper`] — at-most-once per transaction id per block cycle
//! - [`ChainPoller`] — single-flight fixed-interval scheduler
//! - [`JsonFileStore`] — durable resume state

pub mod broadcast;
pub mod dedup;
pub mod detect;
pub mod enrich;
pub mod poller;
pub mod registry;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use broadcast::Broadcaster;
pub use dedup::TxDeduper;
pub use detect::is_new_block;
pub use enrich::{EnrichError, Enriched, TxEnricher};
pub use poller::{ChainPoller, PollerConfig};
pub use registry::{EventSink, SinkId, SubscriptionRegistry};
pub use store::JsonFileStore;
