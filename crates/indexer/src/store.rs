//! In-process store for the strategy transaction read model.

use crate::events::EventEnvelope;
use crate::projection::StrategyTxRecord;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Append-or-update store keyed by transaction hash.
///
/// Records are never deleted; replaying events is safe because every
/// projection rule is idempotent.
pub struct StrategyTxStore {
    records: Arc<RwLock<HashMap<String, StrategyTxRecord>>>,
}

impl Default for StrategyTxStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyTxStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Projects one event into the store.
    pub async fn apply(&self, envelope: &EventEnvelope) {
        let mut records = self.records.write().await;
        let record = records
            .entry(envelope.tx_hash.clone())
            .or_insert_with(|| StrategyTxRecord::new(envelope.tx_hash.clone()));
        let applied = record.apply(envelope);
        debug!(
            tx_hash = %envelope.tx_hash,
            applied,
            tx_type = ?record.tx_type,
            "projected strategy event"
        );
    }

    pub async fn get(&self, tx_hash: &str) -> Option<StrategyTxRecord> {
        self.records.read().await.get(tx_hash).cloned()
    }

    /// All records, most recent first. Records without a timestamp yet
    /// (mint seen before its deposit) sort last.
    pub async fn all(&self) -> Vec<StrategyTxRecord> {
        let mut records: Vec<StrategyTxRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    pub async fn for_owner(&self, owner: &str) -> Vec<StrategyTxRecord> {
        self.records
            .read()
            .await
            .values()
            .filter(|r| {
                r.owner
                    .as_deref()
                    .is_some_and(|o| o.eq_ignore_ascii_case(owner))
            })
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
