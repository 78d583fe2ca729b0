//! Fan-out of one event to every sink on a topic.

use serde_json::Value;

use tipcast_core::events::Topic;

use crate::registry::SubscriptionRegistry;

/// Delivers events to the registry's sinks. Serializes once per event;
/// each sink's failure is reported and contained — it never aborts the
/// broadcast and never unregisters the sink.
#[derive(Clone)]
pub struct Broadcaster {
    registry: SubscriptionRegistry,
}

impl Broadcaster {
    pub fn new(registry: SubscriptionRegistry) -> Self {
        Self { registry }
    }

    /// Send `event` to every sink currently on `topic`. Returns the number
    /// of successful deliveries.
    pub async fn broadcast(&self, topic: Topic, event: &Value) -> usize {
        let payload = event.to_string();
        let sinks = self.registry.snapshot(topic);
        let mut delivered = 0;

        for sink in sinks {
            match sink.deliver(&payload).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(sink = %sink.id(), %topic, error = %e, "delivery failed");
                }
            }
        }

        delivered
    }
}
