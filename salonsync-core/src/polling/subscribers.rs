//! Subscriber registry shared by a session and its fetch tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::outcome::FetchOutcome;

type Callback = Arc<dyn Fn(&FetchOutcome) + Send + Sync>;
type Entries = Mutex<Vec<(u64, Callback)>>;

fn lock(entries: &Entries) -> MutexGuard<'_, Vec<(u64, Callback)>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    entries: Arc<Entries>,
}

impl SubscriberRegistry {
    pub(crate) fn subscribe<C>(&self, callback: C) -> Subscription
    where
        C: Fn(&FetchOutcome) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((id, Arc::new(callback)));
        Subscription {
            id,
            entries: Arc::downgrade(&self.entries),
        }
    }

    /// Call every subscriber registered when notification starts.
    ///
    /// The lock is released before any callback runs, so callbacks may
    /// subscribe or unsubscribe (themselves included) freely.
    pub(crate) fn notify(&self, outcome: &FetchOutcome) {
        let snapshot: Vec<Callback> = lock(&self.entries)
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in snapshot {
            callback(outcome);
        }
    }

    pub(crate) fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.entries).len()
    }
}

/// Handle returned by `PollingSession::subscribe`.
///
/// Dropping it keeps the subscription alive; call `unsubscribe` to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    entries: Weak<Entries>,
}

impl Subscription {
    /// Remove the callback. Returns false if it was already removed or the
    /// session is gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(entries) = self.entries.upgrade() else {
            return false;
        };
        let mut entries = lock(&entries);
        let before = entries.len();
        entries.retain(|(id, _)| *id != self.id);
        entries.len() != before
    }
}
