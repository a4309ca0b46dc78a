//! Short-lived roster cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::error::SyncResult;
use crate::fetch::RosterFetcher;
use crate::master::MasterRecord;

struct CachedRoster {
    fetched_at: Instant,
    masters: Arc<Vec<MasterRecord>>,
}

type Slot = Arc<Mutex<Option<CachedRoster>>>;

/// Wraps a `RosterFetcher` and reuses each branch's roster for `ttl`.
///
/// Each branch has its own slot: concurrent lookups for a stale branch wait
/// on one fetch, while other branches are served independently. Failed
/// fetches are not cached.
pub struct RosterCache<F> {
    fetcher: F,
    ttl: Duration,
    slots: StdMutex<HashMap<String, Slot>>,
}

impl<F: RosterFetcher> RosterCache<F> {
    pub fn new(fetcher: F, ttl: Duration) -> Self {
        RosterCache {
            fetcher,
            ttl,
            slots: StdMutex::new(HashMap::new()),
        }
    }

    pub async fn roster(&self, branch_id: &str) -> SyncResult<Arc<Vec<MasterRecord>>> {
        let slot = self.slot(branch_id);
        let mut cached = slot.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.masters.clone());
            }
        }

        debug!(branch_id, "fetching roster");
        let masters = Arc::new(self.fetcher.fetch_roster(branch_id).await?);
        *cached = Some(CachedRoster {
            fetched_at: Instant::now(),
            masters: masters.clone(),
        });

        Ok(masters)
    }

    /// Drop the cached roster so the next lookup refetches.
    pub async fn invalidate(&self, branch_id: &str) {
        *self.slot(branch_id).lock().await = None;
    }

    fn slot(&self, branch_id: &str) -> Slot {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(branch_id.to_string())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl<F: RosterFetcher> RosterFetcher for RosterCache<F> {
    async fn fetch_roster(&self, branch_id: &str) -> SyncResult<Vec<MasterRecord>> {
        Ok(self.roster(branch_id).await?.as_ref().clone())
    }
}
