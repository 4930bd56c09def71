// Analysis history storage - bounded, time-windowed reads for risk scoring

use crate::core::errors::FirewallError;
use crate::core::models::HistoryRecord;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Hard cap on records returned by one history fetch.
pub const HISTORY_FETCH_LIMIT: usize = 1000;

/// History collaborator consumed by the anomaly scorer.
///
/// Implementations MUST return records most-recent-first: the
/// pattern-anomaly check reads the head of the list as "recent", and any
/// other ordering changes its meaning.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Records for `(user_id, tenant_id)` with timestamp within the last
    /// `window_days` days, most-recent-first, capped at
    /// [`HISTORY_FETCH_LIMIT`].
    async fn user_history(
        &self,
        user_id: &str,
        tenant_id: &str,
        window_days: i64,
    ) -> Result<Vec<HistoryRecord>, FirewallError>;

    /// Persist one analysis snapshot.
    async fn record(&self, record: HistoryRecord) -> Result<(), FirewallError>;
}

/// How many records the in-memory store keeps in total before evicting the
/// oldest.
const IN_MEMORY_CAPACITY: usize = 10_000;

/// In-process history store.
///
/// Newest records sit at the front of the deque, so windowed reads are a
/// prefix scan and the most-recent-first contract holds by construction.
pub struct InMemoryHistoryStore {
    records: RwLock<VecDeque<HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
        }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn user_history(
        &self,
        user_id: &str,
        tenant_id: &str,
        window_days: i64,
    ) -> Result<Vec<HistoryRecord>, FirewallError> {
        let cutoff = Utc::now() - Duration::days(window_days);
        let records = self.records.read().await;

        Ok(records
            .iter()
            .filter(|r| {
                r.user_id == user_id && r.tenant_id == tenant_id && r.timestamp >= cutoff
            })
            .take(HISTORY_FETCH_LIMIT)
            .cloned()
            .collect())
    }

    async fn record(&self, record: HistoryRecord) -> Result<(), FirewallError> {
        let mut records = self.records.write().await;
        records.push_front(record);
        if records.len() > IN_MEMORY_CAPACITY {
            records.pop_back();
        }
        Ok(())
    }
}
