//! Per-block-cycle transaction deduplication.

use std::collections::HashSet;

/// Tracks transaction ids already dispatched since the last accepted
/// block. Ids are marked as seen the moment they are selected for
/// dispatch (update-before-send), so a transaction whose enrichment later
/// fails is not retried within the cycle.
#[derive(Debug, Default)]
pub struct TxDeduper {
    seen: HashSet<String>,
}

impl TxDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with the ids persisted from a previous run of this cycle.
    pub fn from_seen(seen: HashSet<String>) -> Self {
        Self { seen }
    }

    /// Clear the set — called exactly when a new block is accepted.
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    /// The subsequence of `txids` not seen before, in original order.
    /// Every returned id is marked seen.
    pub fn filter_new(&mut self, txids: &[String]) -> Vec<String> {
        txids
            .iter()
            .filter(|id| self.seen.insert((*id).clone()))
            .cloned()
            .collect()
    }

    pub fn is_seen(&self, txid: &str) -> bool {
        self.seen.contains(txid)
    }

    /// The current dedup set, for persistence.
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_pass_returns_everything_in_order() {
        let mut dedup = TxDeduper::new();
        assert_eq!(dedup.filter_new(&ids(&["t1", "t2", "t3"])), ids(&["t1", "t2", "t3"]));
    }

    #[test]
    fn growing_list_across_ticks_yields_each_id_once() {
        let mut dedup = TxDeduper::new();
        assert_eq!(dedup.filter_new(&ids(&["t1", "t2"])), ids(&["t1", "t2"]));
        assert_eq!(dedup.filter_new(&ids(&["t1", "t2", "t3"])), ids(&["t3"]));
        assert_eq!(dedup.filter_new(&ids(&["t1", "t2", "t3"])), Vec::<String>::new());
    }

    #[test]
    fn reset_makes_ids_eligible_again() {
        let mut dedup = TxDeduper::new();
        dedup.filter_new(&ids(&["t1"]));
        dedup.reset();
        assert_eq!(dedup.filter_new(&ids(&["t1"])), ids(&["t1"]));
    }

    #[test]
    fn resumed_set_suppresses_already_broadcast_ids() {
        let mut dedup = TxDeduper::from_seen(["t1".to_string()].into());
        assert_eq!(dedup.filter_new(&ids(&["t1", "t2"])), ids(&["t2"]));
    }

    #[test]
    fn empty_list_is_a_noop() {
        let mut dedup = TxDeduper::new();
        assert!(dedup.filter_new(&[]).is_empty());
        assert!(dedup.seen().is_empty());
    }
}
