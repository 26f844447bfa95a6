//! Keyed store of recent extraction results, used for CSV downloads.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use locscrape_scraper::LocationRecord;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct StoreInner {
    order: VecDeque<Uuid>,
    records: HashMap<Uuid, Arc<Vec<LocationRecord>>>,
}

/// Bounded map of result id to records. Inserting past capacity evicts the
/// oldest entry.
#[derive(Debug, Clone)]
pub struct ResultStore {
    capacity: usize,
    inner: Arc<Mutex<StoreInner>>,
}

impl ResultStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Arc::new(Mutex::new(StoreInner::default())),
        }
    }

    /// Store `records` under a fresh id and return it.
    pub async fn insert(&self, records: Vec<LocationRecord>) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.inner.lock().await;
        while inner.order.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.records.remove(&oldest);
            tracing::debug!(result_id = %oldest, "evicted oldest stored result");
        }
        inner.order.push_back(id);
        inner.records.insert(id, Arc::new(records));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Vec<LocationRecord>>> {
        self.inner.lock().await.records.get(&id).cloned()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }
}
