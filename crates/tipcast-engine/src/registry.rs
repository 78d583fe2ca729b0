//! Subscriber registry — who is listening on which topic.
//!
//! Mutated concurrently by the transport's connect/disconnect handling and
//! read concurrently by the broadcaster; broadcasts work on a snapshot so
//! a sink removed mid-broadcast never fails the others.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use tipcast_core::error::SinkError;
use tipcast_core::events::Topic;

static NEXT_SINK_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(u64);

impl SinkId {
    /// Allocate a fresh process-unique id.
    pub fn next() -> Self {
        Self(NEXT_SINK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A destination capable of receiving one serialized event.
///
/// Delivery failures are the caller's problem to report; a sink must never
/// be removed from the registry as a side effect of a failed send — only
/// the transport unregisters sinks, on disconnect.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    fn id(&self) -> SinkId;
    async fn deliver(&self, payload: &str) -> Result<(), SinkError>;
}

#[derive(Default)]
struct Inner {
    blocks: Vec<Arc<dyn EventSink>>,
    transactions: Vec<Arc<dyn EventSink>>,
}

impl Inner {
    fn list_mut(&mut self, topic: Topic) -> &mut Vec<Arc<dyn EventSink>> {
        match topic {
            Topic::Blocks => &mut self.blocks,
            Topic::Transactions => &mut self.transactions,
        }
    }

    fn list(&self, topic: Topic) -> &Vec<Arc<dyn EventSink>> {
        match topic {
            Topic::Blocks => &self.blocks,
            Topic::Transactions => &self.transactions,
        }
    }
}

/// Per-topic subscriber sets. The two topics are fully independent; a sink
/// subscribed to both holds two separate memberships.
#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a sink to a topic. Subscribing twice is a no-op.
    pub fn add(&self, topic: Topic, sink: Arc<dyn EventSink>) {
        let mut inner = self.inner.lock().unwrap();
        let list = inner.list_mut(topic);
        if list.iter().any(|s| s.id() == sink.id()) {
            return;
        }
        tracing::debug!(sink = %sink.id(), %topic, "subscriber added");
        list.push(sink);
    }

    /// Remove a sink from one topic. Removing an absent sink is a no-op.
    pub fn remove(&self, topic: Topic, id: SinkId) {
        let mut inner = self.inner.lock().unwrap();
        let list = inner.list_mut(topic);
        if let Some(pos) = list.iter().position(|s| s.id() == id) {
            list.remove(pos);
            tracing::debug!(sink = %id, %topic, "subscriber removed");
        }
    }

    /// Remove a sink from both topics (connection closed).
    pub fn remove_all(&self, id: SinkId) {
        self.remove(Topic::Blocks, id);
        self.remove(Topic::Transactions, id);
    }

    /// The sinks subscribed to `topic` at this instant.
    pub fn snapshot(&self, topic: Topic) -> Vec<Arc<dyn EventSink>> {
        self.inner.lock().unwrap().list(topic).clone()
    }

    /// Number of sinks on a topic.
    pub fn len(&self, topic: Topic) -> usize {
        self.inner.lock().unwrap().list(topic).len()
    }

    pub fn is_empty(&self, topic: Topic) -> bool {
        self.len(topic) == 0
    }
}
