//! One polling session: a repeating fetch cycle for one date window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tracing::{debug, error, info, warn};

use super::PollingConfig;
use super::outcome::{FetchOrigin, FetchOutcome};
use super::subscribers::{SubscriberRegistry, Subscription};
use crate::date_window::DateWindow;
use crate::error::{SyncError, SyncResult};
use crate::fetch::{TaskFetcher, TaskQuery};

struct Timer {
    handle: JoinHandle<()>,
    window: DateWindow,
}

#[derive(Default)]
struct CycleState {
    window: Option<DateWindow>,
    timer: Option<Timer>,
}

struct Inner<F> {
    fetcher: F,
    config: PollingConfig,
    subscribers: SubscriberRegistry,
    cycle: Mutex<CycleState>,
}

/// Keeps a task list fresh by fetching it on a fixed interval and pushing
/// every result, success or failure, to all subscribers.
///
/// At most one timer runs per session. Within a cycle a tick is skipped
/// (not queued) while the previous fetch is still outstanding. Stopping
/// cancels the timer but never an in-flight fetch; its outcome is still
/// delivered. Dropping the session stops the timer and forgets all
/// subscribers, so anything that settles afterwards is discarded.
///
/// Must be used from within a tokio runtime.
pub struct PollingSession<F: TaskFetcher + 'static> {
    inner: Arc<Inner<F>>,
}

impl<F: TaskFetcher + 'static> PollingSession<F> {
    pub fn new(fetcher: F, config: PollingConfig) -> Self {
        PollingSession {
            inner: Arc::new(Inner {
                fetcher,
                config,
                subscribers: SubscriberRegistry::default(),
                cycle: Mutex::new(CycleState::default()),
            }),
        }
    }

    pub fn config(&self) -> &PollingConfig {
        &self.inner.config
    }

    /// Register `callback` for every future outcome.
    pub fn subscribe<C>(&self, callback: C) -> Subscription
    where
        C: Fn(&FetchOutcome) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    /// Subscribe through a channel instead of a callback.
    pub fn subscribe_channel(
        &self,
    ) -> (Subscription, tokio::sync::mpsc::UnboundedReceiver<FetchOutcome>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let subscription = self.subscribe(move |outcome| {
            // receiver gone means the consumer stopped listening
            let _ = tx.send(outcome.clone());
        });
        (subscription, rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Start fetching `window`: once immediately, then every interval.
    ///
    /// Fails without side effects when the branch is not configured or the
    /// interval is zero, and with `AlreadyRunning` when a cycle is active.
    pub fn start(&self, window: DateWindow) -> SyncResult<()> {
        let query = self.inner.query(window)?;
        if self.inner.config.interval.is_zero() {
            return Err(SyncError::Config("poll interval must be positive".into()));
        }

        let mut cycle = self.inner.lock_cycle();
        if cycle.timer.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return Err(SyncError::AlreadyRunning);
        }

        let busy = Arc::new(AtomicBool::new(false));
        // First fetch is spawned here so it happens even if stop() follows
        // before the timer task gets scheduled.
        spawn_tick(&self.inner, &query, &busy);

        let handle = tokio::spawn(run_timer(self.inner.clone(), query, busy));
        cycle.window = Some(window);
        cycle.timer = Some(Timer { handle, window });

        info!(
            branch_id = ?self.inner.config.branch_id,
            %window,
            interval = ?self.inner.config.interval,
            "polling started"
        );
        Ok(())
    }

    /// Cancel the timer. In-flight fetches are left to finish.
    pub fn stop(&self) {
        let timer = self.inner.lock_cycle().timer.take();
        if let Some(timer) = timer {
            timer.handle.abort();
            info!(window = %timer.window, "polling stopped");
        }
    }

    /// Stop, wait for the settle delay, then start again with `window` or
    /// the last window used.
    pub async fn restart(&self, window: Option<DateWindow>) -> SyncResult<()> {
        let window = window
            .or_else(|| self.window())
            .ok_or_else(|| SyncError::Config("no date window to restart with".into()))?;

        self.stop();
        tokio::time::sleep(self.inner.config.restart_settle).await;
        self.start(window)
    }

    /// Point the session at a new window. A running cycle is restarted so it
    /// never keeps fetching the old window.
    pub async fn set_window(&self, window: DateWindow) -> SyncResult<()> {
        let running_window = {
            let mut cycle = self.inner.lock_cycle();
            let running = cycle
                .timer
                .as_ref()
                .filter(|t| !t.handle.is_finished())
                .map(|t| t.window);
            if running.is_none() {
                cycle.window = Some(window);
            }
            running
        };

        match running_window {
            Some(current) if current == window => Ok(()),
            Some(_) => self.restart(Some(window)).await,
            None => Ok(()),
        }
    }

    /// One fetch outside the timer cadence. The outcome goes to all
    /// subscribers and is also returned.
    pub async fn fetch_manually(&self, window: DateWindow) -> FetchOutcome {
        let outcome = match self.inner.query(window) {
            Ok(query) => self.inner.fetch(&query, FetchOrigin::Manual).await,
            Err(e) => FetchOutcome::failed(&e, window, FetchOrigin::Manual),
        };
        self.inner.subscribers.notify(&outcome);
        outcome
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .lock_cycle()
            .timer
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Window of the current or most recent cycle.
    pub fn window(&self) -> Option<DateWindow> {
        self.inner.lock_cycle().window
    }
}

impl<F: TaskFetcher + 'static> Drop for PollingSession<F> {
    fn drop(&mut self) {
        self.stop();
        self.inner.subscribers.clear();
    }
}

impl<F: TaskFetcher> Inner<F> {
    fn lock_cycle(&self) -> MutexGuard<'_, CycleState> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn query(&self, window: DateWindow) -> SyncResult<TaskQuery> {
        let branch_id = self
            .config
            .branch_id
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| SyncError::Config("branch_id is required to poll tasks".into()))?;

        Ok(TaskQuery {
            branch_id: branch_id.to_string(),
            window,
            sort: self.config.sort,
            user_role: self.config.user_role.clone(),
            user_master_id: self.config.user_master_id.clone(),
        })
    }

    async fn fetch(&self, query: &TaskQuery, origin: FetchOrigin) -> FetchOutcome {
        let limit = self.config.fetch_timeout;
        let result = match timeout(limit, self.fetcher.fetch_tasks(query)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout(limit.as_secs())),
        };

        match result {
            Ok(tasks) => {
                debug!(%origin, window = %query.window, count = tasks.len(), "tasks fetched");
                FetchOutcome::succeeded(tasks, query.window, origin)
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(%origin, window = %query.window, error = %e, "task fetch failed");
                } else {
                    error!(%origin, window = %query.window, error = %e, "task fetch failed");
                }
                FetchOutcome::failed(&e, query.window, origin)
            }
        }
    }
}

/// Run one timer tick unless the cycle's previous fetch is still out.
fn spawn_tick<F: TaskFetcher + 'static>(
    inner: &Arc<Inner<F>>,
    query: &TaskQuery,
    busy: &Arc<AtomicBool>,
) {
    if busy.swap(true, Ordering::AcqRel) {
        debug!(window = %query.window, "previous fetch still outstanding, skipping tick");
        return;
    }

    let inner = inner.clone();
    let query = query.clone();
    let busy = busy.clone();
    tokio::spawn(async move {
        let outcome = inner.fetch(&query, FetchOrigin::Timer).await;
        inner.subscribers.notify(&outcome);
        busy.store(false, Ordering::Release);
    });
}

async fn run_timer<F: TaskFetcher + 'static>(
    inner: Arc<Inner<F>>,
    query: TaskQuery,
    busy: Arc<AtomicBool>,
) {
    let period = inner.config.interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        spawn_tick(&inner, &query, &busy);
    }
}
